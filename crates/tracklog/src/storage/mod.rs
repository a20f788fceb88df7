//! Storage layer for tracklog.
//!
//! This module provides `SQLite`-based persistent storage for location
//! samples. The store is append/clear only: samples are never updated
//! in place, and the only delete is the unconditional `clear_all`.

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::sample::LocationSample;

/// Append-only store for location samples.
///
/// Writes are flushed to stable storage before `append` returns
/// (`synchronous=FULL`), so a reported success survives an immediate
/// crash.
#[derive(Debug)]
pub struct Store {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl Store {
    /// Open or create a store database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    /// Initializes the schema if this is a new database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema
    /// initialization fails. Callers treat this as a startup-abort
    /// condition: sampling never begins without an openable store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        // FULL sync so a successful append is durable before it returns
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=FULL;")?;

        migrations::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory store for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a sample to the store.
    ///
    /// Returns the assigned ID. The sample is durable by the time this
    /// returns `Ok`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSample`] if the coordinates are NaN or out
    /// of range, or [`Error::StoreWrite`] if the database operation fails.
    pub fn append(&self, sample: &LocationSample) -> Result<i64> {
        if !sample.is_valid() {
            return Err(Error::invalid_sample(sample.latitude, sample.longitude));
        }

        let timestamp = sample.timestamp.to_rfc3339();

        self.conn
            .execute(
                r"
                INSERT INTO locations (latitude, longitude, timestamp)
                VALUES (?1, ?2, ?3)
                ",
                params![sample.latitude, sample.longitude, timestamp],
            )
            .map_err(|source| Error::StoreWrite { source })?;

        let id = self.conn.last_insert_rowid();
        debug!("Appended sample with id {}", id);
        Ok(id)
    }

    /// Fetch all samples in insertion order.
    ///
    /// Non-destructive and side-effect-free.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn fetch_all(&self) -> Result<Vec<LocationSample>> {
        let mut stmt = self.conn.prepare(
            r"
            SELECT id, latitude, longitude, timestamp
            FROM locations ORDER BY id ASC
            ",
        )?;

        let samples = stmt
            .query_map([], Self::row_to_sample)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(samples)
    }

    /// Delete every sample unconditionally.
    ///
    /// Returns the number of samples deleted. Irreversible; confirmation,
    /// if any, belongs to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreClear`] if the database operation fails.
    pub fn clear_all(&self) -> Result<usize> {
        let affected = self
            .conn
            .execute("DELETE FROM locations", [])
            .map_err(|source| Error::StoreClear { source })?;

        info!("Cleared {} samples", affected);
        Ok(affected)
    }

    /// Count total samples in the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count(&self) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM locations", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Get store statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StoreStats> {
        let total_samples = self.count()?;

        let oldest: Option<String> = self
            .conn
            .query_row(
                "SELECT timestamp FROM locations ORDER BY timestamp ASC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;

        let newest: Option<String> = self
            .conn
            .query_row(
                "SELECT timestamp FROM locations ORDER BY timestamp DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;

        let oldest_sample = oldest
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&Utc));
        let newest_sample = newest
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&Utc));

        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StoreStats {
            total_samples,
            oldest_sample,
            newest_sample,
            db_size_bytes,
        })
    }

    /// Convert a database row to a `LocationSample`.
    fn row_to_sample(row: &rusqlite::Row) -> rusqlite::Result<LocationSample> {
        let id: i64 = row.get(0)?;
        let latitude: f64 = row.get(1)?;
        let longitude: f64 = row.get(2)?;
        let timestamp_str: String = row.get(3)?;

        let timestamp = DateTime::parse_from_rfc3339(&timestamp_str)
            .map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc));

        Ok(LocationSample {
            id: Some(id),
            latitude,
            longitude,
            timestamp,
        })
    }
}

/// Statistics about the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStats {
    /// Total number of samples stored.
    pub total_samples: i64,
    /// Timestamp of the oldest sample.
    pub oldest_sample: Option<DateTime<Utc>>,
    /// Timestamp of the newest sample.
    pub newest_sample: Option<DateTime<Utc>>,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}
