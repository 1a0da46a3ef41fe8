/// CLI error types
use lectern_core::LecternError;
use lectern_playback::{PlaybackError, UnsupportedRate};
use lectern_storage::StorageError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Catalog error: {0}")]
    Catalog(#[from] LecternError),

    #[error("Playback error: {0}")]
    Playback(#[from] PlaybackError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Rate(#[from] UnsupportedRate),

    #[error("Player task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl CliError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
