//! Core error type for the Vitamins tracker.
//!
//! `TrackerError` is returned by the storage backends and by configuration
//! loading. The tracker operations themselves never fail: persistence
//! errors are logged and swallowed inside [`crate::persistence`].

#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl From<serde_json::Error> for TrackerError {
    fn from(e: serde_json::Error) -> Self {
        TrackerError::Serialization(e.to_string())
    }
}

impl From<rusqlite::Error> for TrackerError {
    fn from(e: rusqlite::Error) -> Self {
        TrackerError::Storage(e.to_string())
    }
}
