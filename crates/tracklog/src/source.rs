//! Location subsystem abstraction.
//!
//! This module defines the seam between the sampler and whatever
//! provides geographic positions: the OS location service in a real
//! deployment, or [`crate::sim::SimulatedSource`] here.

use thiserror::Error;

use crate::sample::Fix;

/// Errors that can occur while requesting a location fix.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Location services are disabled on the host; sampling does not proceed.
    #[error("location services disabled")]
    ServicesDisabled,

    /// The user denied location authorization.
    #[error("location authorization denied")]
    AuthorizationDenied,

    /// A transient fix failure; the next tick retries naturally.
    #[error("fix failed: {0}")]
    FixFailed(String),
}

/// Result type for location source operations.
pub type Result<T> = std::result::Result<T, SourceError>;

/// Authorization state reported by the location subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Authorization {
    /// The user has not been asked yet.
    NotDetermined,
    /// The user denied access.
    Denied,
    /// Access is granted.
    Granted,
}

impl std::fmt::Display for Authorization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotDetermined => write!(f, "not determined"),
            Self::Denied => write!(f, "denied"),
            Self::Granted => write!(f, "granted"),
        }
    }
}

/// A provider of geographic positions.
///
/// The sampler issues at most one outstanding `request_fix` call at a
/// time; implementations never have to cope with overlapping requests.
#[async_trait::async_trait]
pub trait LocationSource: Send {
    /// Check whether location services are enabled on the host.
    fn services_enabled(&self) -> bool;

    /// Get the current authorization state.
    fn authorization(&self) -> Authorization;

    /// Ask the user for location authorization.
    ///
    /// Returns the resulting authorization state.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be made.
    async fn request_authorization(&mut self) -> Result<Authorization>;

    /// Request a single location fix.
    ///
    /// Delivery may batch more than one position; callers use the first.
    /// An empty batch is a valid (if unusual) delivery.
    ///
    /// # Errors
    ///
    /// Returns an error if the fix cannot be obtained. Fix errors are
    /// transient; no retry happens before the next scheduled tick.
    async fn request_fix(&mut self) -> Result<Vec<Fix>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_error_display() {
        assert!(SourceError::ServicesDisabled
            .to_string()
            .contains("disabled"));
        assert!(SourceError::AuthorizationDenied
            .to_string()
            .contains("denied"));
        assert!(SourceError::FixFailed("no signal".to_string())
            .to_string()
            .contains("no signal"));
    }

    #[test]
    fn test_authorization_display() {
        assert_eq!(Authorization::NotDetermined.to_string(), "not determined");
        assert_eq!(Authorization::Denied.to_string(), "denied");
        assert_eq!(Authorization::Granted.to_string(), "granted");
    }
}
