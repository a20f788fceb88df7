//! Error types for tracklog.
//!
//! This module defines all error types used throughout the tracklog crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for tracklog operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the database.
    ///
    /// This is the one startup-abort condition: sampling never begins
    /// without an openable store.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    /// Failed to append a sample to the store.
    #[error("failed to write sample: {source}")]
    StoreWrite {
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// Failed to clear the sample history.
    #[error("failed to clear history: {source}")]
    StoreClear {
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A sample with NaN or out-of-range coordinates was rejected.
    #[error("invalid sample coordinates: ({latitude}, {longitude})")]
    InvalidSample {
        /// The rejected latitude.
        latitude: f64,
        /// The rejected longitude.
        longitude: f64,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for tracklog operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create an invalid-sample error for the given coordinates.
    #[must_use]
    pub fn invalid_sample(latitude: f64, longitude: f64) -> Self {
        Self::InvalidSample {
            latitude,
            longitude,
        }
    }

    /// Check if this error indicates rejected sample coordinates.
    #[must_use]
    pub fn is_invalid_sample(&self) -> bool {
        matches!(self, Self::InvalidSample { .. })
    }

    /// Check if this error came from the storage layer.
    #[must_use]
    pub fn is_storage_error(&self) -> bool {
        matches!(
            self,
            Self::DatabaseOpen { .. }
                | Self::DatabaseQuery(_)
                | Self::DatabaseMigration { .. }
                | Self::StoreWrite { .. }
                | Self::StoreClear { .. }
        )
    }
}
