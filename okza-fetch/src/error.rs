//! Fetch error types.

use thiserror::Error;

// ============================================================================
// Main Fetch Error
// ============================================================================

/// Error type for provider operations.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Rate limited by the provider.
    #[error("Rate limited, retry after {retry_after:?} seconds")]
    RateLimited {
        /// Seconds to wait before retrying.
        retry_after: Option<u64>,
    },

    /// Authentication failed.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Invalid response from the provider.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Core error.
    #[error("Core error: {0}")]
    Core(#[from] okza_core::CoreError),

    /// The provider accepted the request but created no job.
    #[error("Job submission failed: {0}")]
    SubmissionFailed(String),

    /// The configured provider URL is unusable.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The operation was cancelled by the caller.
    #[error("Operation cancelled")]
    Cancelled,
}

impl FetchError {
    /// Returns true if a later request might succeed without any change.
    ///
    /// The polling monitor treats transient failures as an empty status
    /// and keeps polling; anything else aborts the poll.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            FetchError::Http(_)
                | FetchError::RateLimited { .. }
                | FetchError::InvalidResponse(_)
                | FetchError::Json(_)
        )
    }
}

// ============================================================================
// Extraction Error
// ============================================================================

/// Where the result path `tasks[0].result[0].items` broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ExtractionError {
    /// `tasks` is missing, not a list, empty, or its first entry is not an object.
    #[error("response has no tasks")]
    NoTasks,

    /// `result` is missing, not a list, empty, or its first entry is not an object.
    #[error("task has no result")]
    NoResult,

    /// `items` is missing or not a list.
    #[error("result has no items list")]
    NoItems,

    /// `items` is a list but holds no usable entry.
    #[error("result has no items")]
    EmptyItems,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(FetchError::RateLimited { retry_after: Some(2) }.is_transient());
        assert!(FetchError::InvalidResponse("HTTP 502".into()).is_transient());
        assert!(!FetchError::AuthenticationFailed("nope".into()).is_transient());
        assert!(!FetchError::SubmissionFailed("no tasks".into()).is_transient());
        assert!(!FetchError::InvalidUrl("x".into()).is_transient());
        assert!(!FetchError::Cancelled.is_transient());
    }
}
