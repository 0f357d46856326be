//! Job-related types.
//!
//! - [`JobId`] - Opaque identifier assigned by the provider
//! - [`Job`] - A submitted search job
//! - [`JobStatus`] - Readiness derived from a status response

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Job Id
// ============================================================================

/// Provider-assigned job identifier.
///
/// The value is opaque; it is only ever echoed back to the provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    /// Wraps a provider identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

// ============================================================================
// Job
// ============================================================================

/// A search job accepted by the provider.
///
/// Created only from a successful submission and never modified afterwards.
/// Every status request for the submission uses this job's id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    /// Provider-assigned identifier.
    pub id: JobId,
    /// Keyword that was searched.
    pub keyword: String,
    /// Location parameter sent with the job.
    pub location: String,
    /// Language parameter sent with the job.
    pub language: String,
}

impl Job {
    /// Creates a job record.
    pub fn new(
        id: JobId,
        keyword: impl Into<String>,
        location: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            id,
            keyword: keyword.into(),
            location: location.into(),
            language: language.into(),
        }
    }
}

// ============================================================================
// Job Status
// ============================================================================

/// Readiness of a job, recomputed from every status response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStatus {
    /// Number of items the provider reports for the job so far.
    pub items_count: u64,
}

impl JobStatus {
    /// Creates a status with the given item count.
    pub fn new(items_count: u64) -> Self {
        Self { items_count }
    }

    /// Returns true once the item count is strictly above `threshold`.
    pub fn is_ready(&self, threshold: u64) -> bool {
        self.items_count > threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ready_is_strictly_above_threshold() {
        assert!(!JobStatus::new(0).is_ready(10));
        assert!(!JobStatus::new(10).is_ready(10));
        assert!(JobStatus::new(11).is_ready(10));
    }

    #[test]
    fn test_job_id_display() {
        let id = JobId::new("03151200-1535-0066-0000-c1e2f7f7a1d3");
        assert_eq!(id.to_string(), "03151200-1535-0066-0000-c1e2f7f7a1d3");
        assert_eq!(id.as_str(), id.to_string());
    }
}
