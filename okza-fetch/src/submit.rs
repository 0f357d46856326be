//! Job submission.

use std::sync::Arc;

use okza_core::{CoreError, Job, JobId};
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::api::{JobApi, JobRequest};
use crate::context::{ApiSettings, SearchSession};
use crate::error::FetchError;
use crate::extract::task_message;

/// Posts search jobs to the provider.
#[derive(Clone)]
pub struct JobSubmitter {
    api: Arc<dyn JobApi>,
    location: String,
    language: String,
}

impl JobSubmitter {
    /// Creates a submitter sending the location and language from `settings`.
    pub fn new(api: Arc<dyn JobApi>, settings: &ApiSettings) -> Self {
        Self {
            api,
            location: settings.location.clone(),
            language: settings.language.clone(),
        }
    }

    /// Submits one keyword and returns the created job.
    ///
    /// The keyword is trimmed first. No retry happens here.
    ///
    /// # Errors
    ///
    /// - [`CoreError::InvalidKeyword`] for an empty keyword, before any request
    /// - [`FetchError::SubmissionFailed`] if the provider created no job
    /// - transport and authentication errors from the API
    #[instrument(skip(self, session))]
    pub async fn submit(&self, session: &SearchSession, keyword: &str) -> Result<Job, FetchError> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(CoreError::InvalidKeyword.into());
        }

        let request = JobRequest::new(keyword, &self.location, &self.language);
        let response = self.api.submit(session.auth_header(), &request).await?;

        let id = parse_submission(&response)?;
        info!(job_id = %id, "Job submitted");

        Ok(Job::new(id, keyword, &self.location, &self.language))
    }
}

impl std::fmt::Debug for JobSubmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobSubmitter")
            .field("location", &self.location)
            .field("language", &self.language)
            .finish_non_exhaustive()
    }
}

/// Reads the job id out of a submission response.
///
/// # Errors
///
/// Returns [`FetchError::SubmissionFailed`] when `tasks` is missing or empty,
/// or when the first task has no non-empty string `id`.
pub fn parse_submission(response: &Value) -> Result<JobId, FetchError> {
    let message = task_message(response);
    if let Some(message) = message {
        debug!(status_message = message, "Provider task status");
    }

    let task = response
        .get("tasks")
        .and_then(Value::as_array)
        .and_then(|tasks| tasks.first())
        .ok_or_else(|| FetchError::SubmissionFailed("provider returned no tasks".to_string()))?;

    task.get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .map(JobId::new)
        .ok_or_else(|| {
            FetchError::SubmissionFailed(
                message.map_or_else(|| "task has no id".to_string(), ToString::to_string),
            )
        })
}
