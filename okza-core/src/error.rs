//! Core error types for Okza.

use thiserror::Error;

/// Core error type for Okza operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A required credential is not set in the environment.
    #[error("Missing credential: {0} is not set")]
    CredentialMissing(String),

    /// The search keyword is empty.
    #[error("Invalid keyword: the keyword must not be empty")]
    InvalidKeyword,

    /// Invalid data from an API response or a store.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}
