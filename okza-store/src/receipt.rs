//! Job receipt side file.
//!
//! After a submission the job is written to a small JSON file so later
//! `status` and `fetch` runs can pick it up without the id being retyped.

use std::path::Path;

use chrono::{DateTime, Utc};
use okza_core::Job;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::StoreError;
use crate::persistence::{load_json, save_json};

/// The last submitted job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobReceipt {
    /// The job as accepted by the provider.
    #[serde(flatten)]
    pub job: Job,
    /// When the job was submitted.
    pub submitted_at: DateTime<Utc>,
}

impl JobReceipt {
    /// Creates a receipt stamped with the current time.
    pub fn new(job: Job) -> Self {
        Self {
            job,
            submitted_at: Utc::now(),
        }
    }

    /// Writes the receipt, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub async fn save(&self, path: &Path) -> Result<(), StoreError> {
        save_json(path, self).await?;
        info!(job_id = %self.job.id, path = %path.display(), "Saved job receipt");
        Ok(())
    }

    /// Reads the receipt.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NoReceipt`] if there is none, or a decode error.
    pub async fn load(path: &Path) -> Result<Self, StoreError> {
        match load_json(path).await {
            Err(e) if e.is_not_found() => Err(StoreError::NoReceipt(path.to_path_buf())),
            other => other,
        }
    }
}
