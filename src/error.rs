//! Error types for palmline
//!
//! Every failure names the offending input so callers can reject it at their
//! own boundary instead of guessing a default.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// palmline error types
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed numeric input (empty curve, wrong vector length, NaN, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A category string outside the fixed vocabulary of a head
    #[error("Invalid category for {head}: {value:?}")]
    InvalidCategory {
        /// Head or attribute the value was checked against
        head: String,
        /// The rejected value
        value: String,
    },

    /// Configuration failed validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Storage error (Parquet/Arrow schema or content)
    #[error("Storage error: {0}")]
    StorageError(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Arrow error
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Parquet error
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Build an [`Error::InvalidCategory`] for `head`.
    pub fn invalid_category(head: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidCategory {
            head: head.into(),
            value: value.into(),
        }
    }
}
