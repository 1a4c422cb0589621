//! Typed error variants for the nameforge-store crate.
//!
//! Storage drivers return these so the registry can tell an I/O failure
//! apart from a document that could not be parsed or does not hang together.

use thiserror::Error;

/// Errors that can occur when saving or loading registry state.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An I/O error occurred reading or writing the state file.
    #[error("I/O error accessing naming state: {0}")]
    Io(#[from] std::io::Error),

    /// The state document could not be serialized or parsed as JSON.
    #[error("JSON error in naming state: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The document parsed but is internally inconsistent.
    ///
    /// The inner string names the offending entry.
    #[error("Invalid naming state: {0}")]
    Invalid(String),
}

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;
