/// Core error types for Lectern
use thiserror::Error;

/// Result type alias using `LecternError`
pub type Result<T> = std::result::Result<T, LecternError>;

/// Core error type for Lectern
#[derive(Error, Debug)]
pub enum LecternError {
    /// Catalog violates a timing invariant
    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl LecternError {
    /// Create an invalid catalog error
    pub fn invalid_catalog(msg: impl Into<String>) -> Self {
        Self::InvalidCatalog(msg.into())
    }
}
