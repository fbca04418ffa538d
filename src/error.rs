//! Error types for Twizzle
//!
//! Every variant says what went wrong and, where it helps, what to do next.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Twizzle error types
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed arguments: empty names, mismatched lengths, reserved keys,
    /// out-of-domain numeric parameters
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Unknown challenge name on get/remove/run
    #[error("No challenge named {0:?} found")]
    NotFound(String),

    /// Challenge name already in use
    #[error("Challenge name {0:?} is already in use. Choose another one.")]
    DuplicateName(String),

    /// Algorithm returned a different number of decisions than the challenge has pairs
    #[error("Decision count mismatch: challenge has {expected} pairs, algorithm returned {found} decisions")]
    SizeMismatch {
        /// Number of pairs in the challenge
        expected: usize,
        /// Number of decisions returned
        found: usize,
    },

    /// Analysis requested before any challenge or test exists
    #[error("Empty dataset: {0}")]
    EmptyDataset(String),

    /// KV backend or snapshot error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Snapshot (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// SQLite backend error
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Arrow error while building the analysis table
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Parquet export error
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A submitted run panicked inside the algorithm callback
    #[error("Test run panicked: {0}")]
    TaskPanicked(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Shorthand for a [`Error::Validation`] with a formatted message.
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
