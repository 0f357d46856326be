//! JSON output formatting.

use anyhow::Result;
use okza_core::{Item, Job, JobId, JobStatus, SearchHistoryEntry};
use okza_fetch::{PollOutcome, ResultSet, SearchOutcome, SearchReport};
use serde::Serialize;

// ============================================================================
// Output Types
// ============================================================================

/// JSON output for a search, status, or fetch run.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOutput<'a> {
    pub job: &'a Job,
    /// `ranked`, `timed_out`, `cancelled`, or `fetched`.
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempts: Option<u32>,
    pub items_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<ResultsOutput<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<HistoryOutput>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_error: Option<&'a str>,
}

/// Ranked items.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsOutput<'a> {
    pub items: &'a [Item],
    pub unpriced: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extraction_error: Option<String>,
}

impl<'a> From<&'a ResultSet> for ResultsOutput<'a> {
    fn from(results: &'a ResultSet) -> Self {
        Self {
            items: &results.items,
            unpriced: results.unpriced,
            extraction_error: results.extraction_error.as_ref().map(ToString::to_string),
        }
    }
}

/// One history entry.
#[derive(Debug, Serialize)]
pub struct HistoryOutput {
    pub keyword: String,
    /// `%Y-%m-%d %H:%M:%S`, or null when the stored value did not parse.
    pub timestamp: Option<String>,
}

impl From<&SearchHistoryEntry> for HistoryOutput {
    fn from(entry: &SearchHistoryEntry) -> Self {
        Self {
            keyword: entry.keyword.clone(),
            timestamp: entry
                .has_known_timestamp()
                .then(|| entry.formatted_timestamp()),
        }
    }
}

// ============================================================================
// Formatter
// ============================================================================

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable value.
    pub fn format<T: Serialize>(&self, data: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        Ok(json)
    }

    /// Formats a finished search.
    pub fn format_report(
        &self,
        report: &SearchReport,
        history: Option<&[SearchHistoryEntry]>,
    ) -> Result<String> {
        let (outcome, items_count, results) = match &report.outcome {
            SearchOutcome::Ranked {
                results, status, ..
            } => ("ranked", status.items_count, Some(ResultsOutput::from(results))),
            SearchOutcome::TimedOut { last_status, .. } => {
                ("timed_out", last_status.items_count, None)
            }
            SearchOutcome::Cancelled { .. } => ("cancelled", 0, None),
        };

        let output = SearchOutput {
            job: &report.job,
            outcome,
            attempts: Some(report.outcome.attempts()),
            items_count,
            duration_ms: Some(u64::try_from(report.duration.as_millis()).unwrap_or(u64::MAX)),
            results,
            history: history.map(|entries| entries.iter().map(HistoryOutput::from).collect()),
            history_error: report.history_error.as_deref(),
        };
        self.format(&output)
    }

    /// Formats a single fetch of an existing job.
    pub fn format_fetched(&self, job: &Job, status: JobStatus, results: &ResultSet) -> Result<String> {
        let output = SearchOutput {
            job,
            outcome: "fetched",
            attempts: None,
            items_count: status.items_count,
            duration_ms: None,
            results: Some(ResultsOutput::from(results)),
            history: None,
            history_error: None,
        };
        self.format(&output)
    }

    /// Formats the end of a polling run for an existing job.
    pub fn format_poll(&self, job_id: &JobId, outcome: &PollOutcome) -> Result<String> {
        let (state, items_count) = match outcome {
            PollOutcome::Ready { status, .. } => ("ready", status.items_count),
            PollOutcome::TimedOut { last_status, .. } => ("timed_out", last_status.items_count),
            PollOutcome::Cancelled { .. } => ("cancelled", 0),
        };

        self.format(&serde_json::json!({
            "jobId": job_id,
            "outcome": state,
            "attempts": outcome.attempts(),
            "itemsCount": items_count,
        }))
    }

    /// Formats history entries.
    pub fn format_history(&self, entries: &[SearchHistoryEntry]) -> Result<String> {
        let output: Vec<HistoryOutput> = entries.iter().map(HistoryOutput::from).collect();
        self.format(&output)
    }
}
