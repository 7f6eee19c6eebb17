//! Error types for the garden core.

use thiserror::Error;

/// Top-level error type for all garden operations.
#[derive(Error, Debug)]
pub enum GardenError {
    /// Submitted text was empty or whitespace-only.
    #[error("Submission rejected: text is empty")]
    EmptySubmission,

    /// A memory record with the given ID was not found.
    #[error("Memory not found: {0}")]
    MemoryNotFound(crate::MemoryId),

    /// The key-value backend failed to read or write.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization or deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// SQLite backend error.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for GardenError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, GardenError>;
