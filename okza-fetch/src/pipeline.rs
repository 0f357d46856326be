//! The search pipeline.
//!
//! One [`SearchPipeline`] runs the whole flow for a keyword: submit, poll
//! until ready, extract, rank, and optionally record the search in a
//! [`SearchLedger`]. All tunables come from [`SearchSettings`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use okza_core::{Item, Job, JobId, JobStatus, SearchHistoryEntry, SearchLedger, rank_items_with};
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::api::{JobApi, MerchantApiClient};
use crate::context::{SearchSession, SearchSettings};
use crate::error::{ExtractionError, FetchError};
use crate::extract::{extract_items, job_status};
use crate::poll::{PollOutcome, PollProgress, PollingMonitor};
use crate::submit::JobSubmitter;

// ============================================================================
// Result Set
// ============================================================================

/// Ranked items extracted from one ready response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    /// Items sorted by ascending price.
    pub items: Vec<Item>,
    /// Number of items whose price was missing or unparsable.
    pub unpriced: usize,
    /// Set when the response did not contain an items list.
    pub extraction_error: Option<ExtractionError>,
}

impl ResultSet {
    /// Returns the number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if no items were extracted.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the cheapest item, if any.
    pub fn cheapest(&self) -> Option<&Item> {
        self.items.first()
    }
}

// ============================================================================
// Search Outcome
// ============================================================================

/// How a search ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// The job became ready and its items were ranked.
    Ranked {
        /// Ranked items.
        results: ResultSet,
        /// Status of the ready response.
        status: JobStatus,
        /// Status requests used.
        attempts: u32,
    },
    /// The job never became ready.
    TimedOut {
        /// Status requests used.
        attempts: u32,
        /// Status seen on the final attempt.
        last_status: JobStatus,
    },
    /// The session was cancelled while polling.
    Cancelled {
        /// Status requests completed.
        attempts: u32,
    },
}

impl SearchOutcome {
    /// Returns the ranked results, if any.
    pub fn results(&self) -> Option<&ResultSet> {
        match self {
            Self::Ranked { results, .. } => Some(results),
            _ => None,
        }
    }

    /// Returns the number of status requests used.
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Ranked { attempts, .. }
            | Self::TimedOut { attempts, .. }
            | Self::Cancelled { attempts } => *attempts,
        }
    }
}

/// Everything one search produced.
#[derive(Debug, Clone)]
pub struct SearchReport {
    /// The submitted job.
    pub job: Job,
    /// How the search ended.
    pub outcome: SearchOutcome,
    /// Wall time from submission to the end of the search.
    pub duration: Duration,
    /// Set when the history entry could not be written.
    pub history_error: Option<String>,
}

impl SearchReport {
    /// Returns true if the search produced ranked results.
    pub fn is_ranked(&self) -> bool {
        matches!(self.outcome, SearchOutcome::Ranked { .. })
    }

    /// Returns true if the search ranked at least one item.
    pub fn has_items(&self) -> bool {
        self.outcome.results().is_some_and(|results| !results.is_empty())
    }
}

// ============================================================================
// Search Pipeline
// ============================================================================

/// Runs the submit, poll, extract, rank flow for a keyword.
#[derive(Clone)]
pub struct SearchPipeline {
    api: Arc<dyn JobApi>,
    submitter: JobSubmitter,
    monitor: PollingMonitor,
    settings: SearchSettings,
}

impl SearchPipeline {
    /// Creates a pipeline over an existing API implementation.
    pub fn new(api: Arc<dyn JobApi>, settings: SearchSettings) -> Self {
        Self {
            submitter: JobSubmitter::new(Arc::clone(&api), &settings.api),
            monitor: PollingMonitor::new(Arc::clone(&api), settings.poll),
            api,
            settings,
        }
    }

    /// Creates a pipeline talking to the provider over HTTPS.
    ///
    /// # Errors
    ///
    /// Fails on an unusable base URL or if the HTTP client cannot be built.
    pub fn from_settings(settings: SearchSettings) -> Result<Self, FetchError> {
        let api = MerchantApiClient::from_settings(&settings.api)?;
        Ok(Self::new(Arc::new(api), settings))
    }

    /// Returns the settings.
    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    /// Returns the job submitter.
    pub fn submitter(&self) -> &JobSubmitter {
        &self.submitter
    }

    /// Returns the polling monitor.
    pub fn monitor(&self) -> &PollingMonitor {
        &self.monitor
    }

    /// Runs the full flow without touching any history.
    ///
    /// # Errors
    ///
    /// Returns submission failures, authentication failures, and
    /// [`FetchError::Cancelled`] if the session is cancelled before a job
    /// exists. Timeout and cancellation while polling are outcomes.
    #[instrument(skip(self, session, on_progress))]
    pub async fn run<F>(
        &self,
        session: &SearchSession,
        keyword: &str,
        on_progress: F,
    ) -> Result<SearchReport, FetchError>
    where
        F: FnMut(&PollProgress) + Send,
    {
        let started = Instant::now();

        let job = tokio::select! {
            biased;
            () = session.cancel_token().cancelled() => return Err(FetchError::Cancelled),
            job = self.submitter.submit(session, keyword) => job?,
        };

        let outcome = match self.monitor.poll(session, &job.id, on_progress).await? {
            PollOutcome::Ready {
                status,
                response,
                attempts,
            } => SearchOutcome::Ranked {
                results: self.rank_response(&response),
                status,
                attempts,
            },
            PollOutcome::TimedOut {
                attempts,
                last_status,
            } => SearchOutcome::TimedOut {
                attempts,
                last_status,
            },
            PollOutcome::Cancelled { attempts } => SearchOutcome::Cancelled { attempts },
        };

        let duration = started.elapsed();
        info!(
            job_id = %job.id,
            attempts = outcome.attempts(),
            duration_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
            "Search finished"
        );

        Ok(SearchReport {
            job,
            outcome,
            duration,
            history_error: None,
        })
    }

    /// Runs the full flow and appends a history entry once at least one
    /// item is ranked.
    ///
    /// A ledger failure does not fail the search; it is logged and kept in
    /// [`SearchReport::history_error`].
    ///
    /// # Errors
    ///
    /// Same as [`SearchPipeline::run`].
    pub async fn run_recorded<L, F>(
        &self,
        session: &SearchSession,
        keyword: &str,
        ledger: &L,
        on_progress: F,
    ) -> Result<SearchReport, FetchError>
    where
        L: SearchLedger,
        F: FnMut(&PollProgress) + Send,
    {
        let mut report = self.run(session, keyword, on_progress).await?;

        if report.has_items() {
            let entry = SearchHistoryEntry::now(report.job.keyword.clone());
            if let Err(err) = ledger.append(&entry) {
                warn!(error = %err, "Failed to record search in history");
                report.history_error = Some(err.to_string());
            }
        }

        Ok(report)
    }

    /// Extracts and ranks the items of a ready response.
    ///
    /// A broken response yields an empty set carrying the extraction error.
    pub fn rank_response(&self, response: &Value) -> ResultSet {
        let items = match extract_items(response) {
            Ok(items) => items,
            Err(err) => {
                warn!(error = %err, "No items in ready response");
                return ResultSet {
                    extraction_error: Some(err),
                    ..ResultSet::default()
                };
            }
        };

        let unpriced = items.iter().filter(|item| !item.price_known).count();
        if unpriced > 0 {
            warn!(
                unpriced,
                policy = self.settings.unpriced.name(),
                "Items without a usable price"
            );
        }

        ResultSet {
            items: rank_items_with(&items, self.settings.unpriced),
            unpriced,
            extraction_error: None,
        }
    }

    /// Issues one status request for an existing job and ranks whatever it
    /// holds, ready or not.
    ///
    /// # Errors
    ///
    /// Returns transport and authentication failures.
    #[instrument(skip(self, session), fields(job_id = %job_id))]
    pub async fn fetch_ranked(
        &self,
        session: &SearchSession,
        job_id: &JobId,
    ) -> Result<(JobStatus, ResultSet), FetchError> {
        let response = tokio::select! {
            biased;
            () = session.cancel_token().cancelled() => return Err(FetchError::Cancelled),
            response = self.api.status(session.auth_header(), job_id) => response?,
        };

        Ok((job_status(&response), self.rank_response(&response)))
    }
}

impl std::fmt::Debug for SearchPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchPipeline")
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
    use crate::testing::{ScriptedApi, status_body};
    use okza_core::{Credentials, UnpricedPolicy};
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryLedger {
        entries: Mutex<Vec<SearchHistoryEntry>>,
        fail: bool,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("disk full")]
    struct DiskFull;

    impl SearchLedger for MemoryLedger {
        type Error = DiskFull;

        fn append(&self, entry: &SearchHistoryEntry) -> Result<(), DiskFull> {
            if self.fail {
                return Err(DiskFull);
            }
            self.entries.lock().unwrap().push(entry.clone());
            Ok(())
        }

        fn snapshot(&self, limit: Option<usize>) -> Result<Vec<SearchHistoryEntry>, DiskFull> {
            let entries = self.entries.lock().unwrap();
            Ok(entries.iter().take(limit.unwrap_or(usize::MAX)).cloned().collect())
        }
    }

    fn session() -> SearchSession {
        SearchSession::new(&Credentials::new("u", "p"))
    }

    fn pipeline(api: ScriptedApi) -> SearchPipeline {
        SearchPipeline::new(Arc::new(api), SearchSettings::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_ranks_ready_response() {
        let api = ScriptedApi::new().with_counts(&[3, 12]);
        let report = pipeline(api).run(&session(), "casque", |_| {}).await.unwrap();

        let SearchOutcome::Ranked {
            results,
            status,
            attempts,
        } = report.outcome
        else {
            panic!("expected ranked outcome");
        };
        assert_eq!(attempts, 2);
        assert_eq!(status.items_count, 12);
        assert_eq!(results.len(), 12);
        assert!(results.items.windows(2).all(|w| w[0].price <= w[1].price));
        assert_eq!(results.cheapest().unwrap().title, "item-0");
    }

    #[tokio::test(start_paused = true)]
    async fn test_submission_failure_aborts_without_polling() {
        let api = Arc::new(ScriptedApi::new().with_submit(Ok(json!({"tasks": []}))));
        let pipeline = SearchPipeline::new(api.clone(), SearchSettings::default());

        let err = pipeline.run(&session(), "casque", |_| {}).await.unwrap_err();
        assert!(matches!(err, FetchError::SubmissionFailed(_)));
        assert!(api.status_calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_recorded_search_appends_once() {
        let ledger = MemoryLedger::default();
        let api = ScriptedApi::new().with_counts(&[11]);

        let report = pipeline(api)
            .run_recorded(&session(), "casque", &ledger, |_| {})
            .await
            .unwrap();

        assert!(report.is_ranked());
        assert!(report.history_error.is_none());
        let entries = ledger.snapshot(None).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].keyword, "casque");
    }

    #[tokio::test(start_paused = true)]
    async fn test_ready_without_items_records_nothing() {
        let ledger = MemoryLedger::default();
        let api = ScriptedApi::new().with_status(Ok(json!({"tasks": [{"result": [{
            "items_count": 12,
            "items": []
        }]}]})));

        let report = pipeline(api)
            .run_recorded(&session(), "casque", &ledger, |_| {})
            .await
            .unwrap();

        let results = report.outcome.results().unwrap();
        assert!(results.is_empty());
        assert_eq!(results.extraction_error, Some(ExtractionError::EmptyItems));
        assert!(!report.has_items());
        assert!(report.history_error.is_none());
        assert!(ledger.snapshot(None).unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_records_nothing() {
        let ledger = MemoryLedger::default();
        let settings = SearchSettings::builder().max_attempts(2).build();
        let pipeline = SearchPipeline::new(Arc::new(ScriptedApi::new()), settings);

        let report = pipeline
            .run_recorded(&session(), "casque", &ledger, |_| {})
            .await
            .unwrap();

        assert!(matches!(report.outcome, SearchOutcome::TimedOut { attempts: 2, .. }));
        assert!(ledger.snapshot(None).unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_ledger_failure_is_reported_not_fatal() {
        let ledger = MemoryLedger {
            fail: true,
            ..MemoryLedger::default()
        };
        let api = ScriptedApi::new().with_counts(&[11]);

        let report = pipeline(api)
            .run_recorded(&session(), "casque", &ledger, |_| {})
            .await
            .unwrap();

        assert!(report.is_ranked());
        assert_eq!(report.history_error.as_deref(), Some("disk full"));
    }

    #[tokio::test]
    async fn test_cancelled_before_submit() {
        let session = session();
        session.cancel();

        let err = pipeline(ScriptedApi::new())
            .run(&session, "casque", |_| {})
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Cancelled));
    }

    #[test]
    fn test_rank_response_counts_unpriced() {
        let body = json!({"tasks": [{"result": [{"items": [
            {"title": "a", "price": "9.99"},
            {"title": "b", "price": "abc"},
            {"title": "c", "price": "3"}
        ]}]}]});

        let results = pipeline(ScriptedApi::new()).rank_response(&body);
        let titles: Vec<_> = results.items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["b", "c", "a"]);
        assert_eq!(results.unpriced, 1);

        let settings = SearchSettings::builder().unpriced(UnpricedPolicy::Last).build();
        let last = SearchPipeline::new(Arc::new(ScriptedApi::new()), settings).rank_response(&body);
        assert_eq!(last.items[2].title, "b");
    }

    #[test]
    fn test_rank_response_broken_path_is_empty() {
        let results = pipeline(ScriptedApi::new()).rank_response(&json!({"tasks": []}));
        assert!(results.is_empty());
        assert_eq!(results.extraction_error, Some(ExtractionError::NoTasks));
    }

    #[tokio::test]
    async fn test_fetch_ranked_single_request() {
        let api = Arc::new(ScriptedApi::new().with_status(Ok(status_body(4))));
        let pipeline = SearchPipeline::new(api.clone(), SearchSettings::default());

        let (status, results) = pipeline
            .fetch_ranked(&session(), &JobId::new("old"))
            .await
            .unwrap();

        assert_eq!(status.items_count, 4);
        assert_eq!(results.len(), 4);
        assert_eq!(api.status_calls(), vec![JobId::new("old")]);
    }
}
