//! Error types for the neighbour search.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CanopyError>;

#[derive(Debug, Error)]
pub enum CanopyError {
    /// A coordinate was non-finite or out of range, or the id was empty.
    #[error("Invalid point {id:?}: {reason}")]
    InvalidPoint { id: String, reason: String },

    /// Two points share an identifier.
    #[error("Duplicate point id: {0}")]
    DuplicateId(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The dense zone grid would exceed the configured zone cap.
    #[error("Zone grid too large: {zones} zones exceeds limit of {limit}")]
    GridTooLarge { zones: usize, limit: usize },

    #[error("Search cancelled")]
    Cancelled,

    /// Input records could not be decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for CanopyError {
    fn from(e: serde_json::Error) -> Self {
        CanopyError::Serialization(e.to_string())
    }
}
