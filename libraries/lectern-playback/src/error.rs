//! Error types for playback management

use thiserror::Error;

/// Playback errors
///
/// Transport commands never fail; only loading a catalog and talking to a
/// stopped driver can.
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// Catalog violates a timing invariant
    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    /// The driver task is no longer running
    #[error("Player driver has shut down")]
    DriverClosed,
}

impl From<lectern_core::LecternError> for PlaybackError {
    fn from(err: lectern_core::LecternError) -> Self {
        match err {
            lectern_core::LecternError::InvalidCatalog(msg) => PlaybackError::InvalidCatalog(msg),
            other => PlaybackError::InvalidCatalog(other.to_string()),
        }
    }
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
