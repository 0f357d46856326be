//! Bounded polling of a submitted job.
//!
//! The monitor issues at most `max_attempts` status requests for one job
//! id, waiting `interval` between them. Both the request and the wait are
//! raced against the session's cancellation token.

use std::sync::Arc;

use okza_core::{JobId, JobStatus};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::api::JobApi;
use crate::context::{PollSettings, SearchSession};
use crate::error::FetchError;
use crate::extract::job_status;

// ============================================================================
// Progress
// ============================================================================

/// Observation emitted after every status request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollProgress {
    /// 1-based attempt number.
    pub attempt: u32,
    /// Attempt budget.
    pub max_attempts: u32,
    /// Item count seen on this attempt.
    pub items_count: u64,
    /// Whether this attempt satisfied the completion predicate.
    pub ready: bool,
}

impl PollProgress {
    /// Completion percentage: `attempt / max_attempts` rounded half up,
    /// and exactly 100 once ready.
    pub fn percent(&self) -> u8 {
        if self.ready {
            return 100;
        }
        let max = u64::from(self.max_attempts.max(1));
        let done = u64::from(self.attempt).min(max);
        u8::try_from((done * 200 + max) / (2 * max)).unwrap_or(100)
    }
}

// ============================================================================
// Outcome
// ============================================================================

/// Terminal state of a polling run.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// The completion predicate held.
    Ready {
        /// Status of the ready response.
        status: JobStatus,
        /// The ready response, kept for extraction.
        response: Value,
        /// Attempts used, including the ready one.
        attempts: u32,
    },
    /// The attempt budget ran out.
    TimedOut {
        /// Attempts used.
        attempts: u32,
        /// Status seen on the final attempt.
        last_status: JobStatus,
    },
    /// The session was cancelled.
    Cancelled {
        /// Attempts completed before cancellation.
        attempts: u32,
    },
}

impl PollOutcome {
    /// Returns the number of status requests that completed.
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Ready { attempts, .. }
            | Self::TimedOut { attempts, .. }
            | Self::Cancelled { attempts } => *attempts,
        }
    }

    /// Returns true for [`PollOutcome::Ready`].
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }
}

// ============================================================================
// Polling Monitor
// ============================================================================

/// Polls job status until it is ready, the budget runs out, or the
/// session is cancelled.
#[derive(Clone)]
pub struct PollingMonitor {
    api: Arc<dyn JobApi>,
    settings: PollSettings,
}

impl PollingMonitor {
    /// Creates a monitor.
    pub fn new(api: Arc<dyn JobApi>, settings: PollSettings) -> Self {
        Self { api, settings }
    }

    /// Returns the polling bounds.
    pub fn settings(&self) -> &PollSettings {
        &self.settings
    }

    /// Runs the polling loop for `job_id`.
    ///
    /// `on_progress` is called once per completed status request. Transient
    /// request failures count as an empty status and polling continues.
    /// There is no wait after the final attempt.
    ///
    /// # Errors
    ///
    /// Returns the first non-transient error, such as an authentication
    /// rejection. Timeout and cancellation are outcomes, not errors.
    #[instrument(skip(self, session, on_progress), fields(job_id = %job_id))]
    pub async fn poll<F>(
        &self,
        session: &SearchSession,
        job_id: &JobId,
        mut on_progress: F,
    ) -> Result<PollOutcome, FetchError>
    where
        F: FnMut(&PollProgress) + Send,
    {
        let max_attempts = self.settings.max_attempts.max(1);
        let threshold = self.settings.ready_threshold;
        let cancel = session.cancel_token();
        let mut last_status = JobStatus::default();

        for attempt in 1..=max_attempts {
            let completed = attempt - 1;

            let result = tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    info!(attempts = completed, "Polling cancelled");
                    return Ok(PollOutcome::Cancelled { attempts: completed });
                }
                result = self.api.status(session.auth_header(), job_id) => result,
            };

            match result {
                Ok(response) => {
                    let status = job_status(&response);
                    let ready = status.is_ready(threshold);
                    debug!(attempt, items_count = status.items_count, ready, "Status received");
                    on_progress(&PollProgress {
                        attempt,
                        max_attempts,
                        items_count: status.items_count,
                        ready,
                    });

                    if ready {
                        info!(attempt, items_count = status.items_count, "Job ready");
                        return Ok(PollOutcome::Ready {
                            status,
                            response,
                            attempts: attempt,
                        });
                    }
                    last_status = status;
                }
                Err(err) if err.is_transient() => {
                    warn!(attempt, error = %err, "Status request failed, counting as empty");
                    on_progress(&PollProgress {
                        attempt,
                        max_attempts,
                        items_count: 0,
                        ready: false,
                    });
                    last_status = JobStatus::default();
                }
                Err(err) => return Err(err),
            }

            if attempt < max_attempts {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => {
                        info!(attempts = attempt, "Polling cancelled");
                        return Ok(PollOutcome::Cancelled { attempts: attempt });
                    }
                    () = tokio::time::sleep(self.settings.interval) => {}
                }
            }
        }

        warn!(attempts = max_attempts, "Job not ready before attempts ran out");
        Ok(PollOutcome::TimedOut {
            attempts: max_attempts,
            last_status,
        })
    }
}

impl std::fmt::Debug for PollingMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollingMonitor")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedApi;
    use okza_core::Credentials;
    use serde_json::json;
    use std::time::Duration;
    use tokio::time::Instant;

    fn session() -> SearchSession {
        SearchSession::new(&Credentials::new("u", "p"))
    }

    fn monitor(api: Arc<ScriptedApi>) -> PollingMonitor {
        PollingMonitor::new(api, PollSettings::default())
    }

    #[test]
    fn test_percent() {
        let p = |attempt, max_attempts, ready| PollProgress {
            attempt,
            max_attempts,
            items_count: 0,
            ready,
        };
        assert_eq!(p(1, 20, false).percent(), 5);
        assert_eq!(p(20, 20, false).percent(), 100);
        assert_eq!(p(1, 3, false).percent(), 33);
        assert_eq!(p(2, 3, false).percent(), 67);
        assert_eq!(p(1, 8, false).percent(), 13);
        assert_eq!(p(1, 20, true).percent(), 100);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ready_exits_early() {
        let api = Arc::new(ScriptedApi::new().with_counts(&[0, 5, 11]));
        let start = Instant::now();
        let mut seen = Vec::new();

        let outcome = monitor(api.clone())
            .poll(&session(), &JobId::new("j"), |p| seen.push(*p))
            .await
            .unwrap();

        assert!(outcome.is_ready());
        assert_eq!(outcome.attempts(), 3);
        assert_eq!(api.status_calls().len(), 3);
        assert_eq!(start.elapsed(), Duration::from_secs(10));
        assert_eq!(seen.len(), 3);
        assert!(seen[2].ready);
        assert_eq!(seen[2].percent(), 100);
    }

    #[tokio::test(start_paused = true)]
    async fn test_threshold_is_strict() {
        let api = Arc::new(ScriptedApi::new().with_counts(&[10, 10]).with_fallback(json!({})));
        let settings = PollSettings {
            max_attempts: 2,
            ..PollSettings::default()
        };

        let outcome = PollingMonitor::new(api, settings)
            .poll(&session(), &JobId::new("j"), |_| {})
            .await
            .unwrap();

        assert_eq!(
            outcome,
            PollOutcome::TimedOut {
                attempts: 2,
                last_status: JobStatus::new(10)
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_result_times_out_after_twenty() {
        let api = Arc::new(ScriptedApi::new());
        let start = Instant::now();

        let outcome = monitor(api.clone())
            .poll(&session(), &JobId::new("j"), |_| {})
            .await
            .unwrap();

        assert!(matches!(outcome, PollOutcome::TimedOut { attempts: 20, .. }));
        let calls = api.status_calls();
        assert_eq!(calls.len(), 20);
        assert!(calls.iter().all(|id| id.as_str() == "j"));
        // No wait after the last attempt.
        assert_eq!(start.elapsed(), Duration::from_secs(19 * 5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_error_counts_as_zero() {
        let api = Arc::new(
            ScriptedApi::new()
                .with_status(Err(FetchError::InvalidResponse("HTTP 502".into())))
                .with_counts(&[12]),
        );
        let mut counts = Vec::new();

        let outcome = monitor(api)
            .poll(&session(), &JobId::new("j"), |p| counts.push(p.items_count))
            .await
            .unwrap();

        assert_eq!(outcome.attempts(), 2);
        assert_eq!(counts, vec![0, 12]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_auth_rejection_aborts() {
        let api = Arc::new(
            ScriptedApi::new().with_status(Err(FetchError::AuthenticationFailed("401".into()))),
        );

        let err = monitor(api.clone())
            .poll(&session(), &JobId::new("j"), |_| {})
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::AuthenticationFailed(_)));
        assert_eq!(api.status_calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_wait() {
        let api = Arc::new(ScriptedApi::new());
        let session = session();
        let handle = session.clone();

        let outcome = monitor(api.clone())
            .poll(&session, &JobId::new("j"), move |p| {
                if p.attempt == 2 {
                    handle.cancel();
                }
            })
            .await
            .unwrap();

        assert_eq!(outcome, PollOutcome::Cancelled { attempts: 2 });
        assert_eq!(api.status_calls().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_before_first_request() {
        let api = Arc::new(ScriptedApi::new());
        let session = session();
        session.cancel();

        let outcome = monitor(api.clone())
            .poll(&session, &JobId::new("j"), |_| {})
            .await
            .unwrap();

        assert_eq!(outcome, PollOutcome::Cancelled { attempts: 0 });
        assert!(api.status_calls().is_empty());
    }
}
