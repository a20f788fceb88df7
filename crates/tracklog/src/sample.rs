//! Core location types for tracklog.
//!
//! This module defines the fundamental data structures for representing
//! location fixes and the persisted samples derived from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One reported geographic position from the location subsystem.
///
/// A fix is ephemeral: it becomes a [`LocationSample`] only when the
/// sampler decides to record it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fix {
    /// Latitude in degrees, valid range [-90, 90].
    pub latitude: f64,
    /// Longitude in degrees, valid range [-180, 180].
    pub longitude: f64,
}

impl Fix {
    /// Create a new fix.
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Check that the coordinates are non-NaN and within range.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        coordinates_valid(self.latitude, self.longitude)
    }
}

/// Check that a (latitude, longitude) pair is non-NaN and within range.
#[must_use]
pub fn coordinates_valid(latitude: f64, longitude: f64) -> bool {
    latitude.is_finite()
        && longitude.is_finite()
        && (-90.0..=90.0).contains(&latitude)
        && (-180.0..=180.0).contains(&longitude)
}

/// A persisted location record.
///
/// Samples are immutable after creation and carry the time they were
/// recorded, not the time the fix was requested. Duplicates are
/// permitted; a stationary device produces identical coordinates on
/// every tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationSample {
    /// Unique identifier for this sample (assigned by the storage layer).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    /// Latitude in degrees.
    pub latitude: f64,

    /// Longitude in degrees.
    pub longitude: f64,

    /// When this sample was recorded.
    pub timestamp: DateTime<Utc>,
}

impl LocationSample {
    /// Create a new sample with the given coordinates, timestamped now.
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            id: None,
            latitude,
            longitude,
            timestamp: Utc::now(),
        }
    }

    /// Create a sample from a delivered fix, timestamped now.
    #[must_use]
    pub fn from_fix(fix: Fix) -> Self {
        Self::new(fix.latitude, fix.longitude)
    }

    /// Check that the coordinates are non-NaN and within range.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        coordinates_valid(self.latitude, self.longitude)
    }

    /// Human-readable timestamp label for map annotations.
    ///
    /// Locale-fixed `"Jan 4, 3:04:05 PM"` style.
    #[must_use]
    pub fn label(&self) -> String {
        self.timestamp.format("%b %-d, %-I:%M:%S %p").to_string()
    }
}
