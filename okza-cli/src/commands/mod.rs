//! CLI command implementations.

pub mod config;
pub mod fetch;
pub mod history;
pub mod search;
pub mod status;
pub mod submit;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use okza_core::{Credentials, Item, Job, JobId, UnpricedPolicy};
use okza_fetch::{CancellationToken, PollProgress, SearchSession, SearchSettings};
use okza_store::{Config, JobReceipt, default_receipt_path};
use tracing::{debug, warn};

use crate::output::{TextFormatter, export};
use crate::{Cli, OutputFormat};

// ============================================================================
// Shared Arguments
// ============================================================================

/// Polling overrides shared by `search` and `status`.
#[derive(Args, Debug, Clone, Default)]
pub struct PollArgs {
    /// Maximum number of status requests.
    #[arg(long, value_name = "N")]
    pub max_attempts: Option<u32>,

    /// Seconds between status requests.
    #[arg(long, value_name = "SECS")]
    pub interval: Option<u64>,

    /// Item count a job must exceed to be ready.
    #[arg(long, value_name = "N")]
    pub threshold: Option<u64>,
}

impl PollArgs {
    /// Applies the overrides on top of configured settings.
    pub fn apply(&self, settings: &mut SearchSettings) {
        if let Some(attempts) = self.max_attempts {
            settings.poll.max_attempts = attempts.max(1);
        }
        if let Some(secs) = self.interval {
            settings.poll.interval = Duration::from_secs(secs);
        }
        if let Some(threshold) = self.threshold {
            settings.poll.ready_threshold = threshold;
        }
    }
}

/// Export targets shared by `search` and `fetch`.
#[derive(Args, Debug, Clone, Default)]
pub struct ExportArgs {
    /// Write the ranked items as CSV.
    #[arg(long, value_name = "FILE")]
    pub csv: Option<PathBuf>,

    /// Write the ranked items as an HTML table.
    #[arg(long, value_name = "FILE")]
    pub html: Option<PathBuf>,
}

impl ExportArgs {
    /// Writes every requested export.
    pub fn write(&self, keyword: &str, items: &[Item]) -> Result<()> {
        if let Some(path) = &self.csv {
            export::write_csv(path, items)?;
        }
        if let Some(path) = &self.html {
            export::write_html(path, &format!("Prices for {keyword}"), items)?;
        }
        Ok(())
    }
}

/// Parses an unpriced policy name for clap.
pub fn parse_policy(name: &str) -> Result<UnpricedPolicy, String> {
    UnpricedPolicy::from_name(name).ok_or_else(|| format!("unknown policy '{name}' (use as-zero or last)"))
}

// ============================================================================
// Helpers
// ============================================================================

/// Loads the configuration named on the command line, or the default one.
pub fn load_config(cli: &Cli) -> Result<Config> {
    let path = cli.config.clone().unwrap_or_else(Config::default_path);
    Config::load_from(&path).with_context(|| format!("loading {}", path.display()))
}

/// Reads credentials and opens a session that Ctrl-C cancels.
pub fn open_session() -> Result<SearchSession> {
    let credentials = Credentials::from_env()?;
    debug!(username = credentials.username(), "Credentials loaded");

    let cancel = CancellationToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling");
            token.cancel();
        }
    });

    Ok(SearchSession::with_cancel(&credentials, cancel))
}

/// Returns a callback printing poll progress to stderr in text mode.
pub fn progress_printer(cli: &Cli) -> impl FnMut(&PollProgress) + Send {
    let show = !cli.quiet && cli.format == OutputFormat::Text;
    let formatter = TextFormatter::new(!cli.no_color);
    move |progress: &PollProgress| {
        if show {
            eprintln!("{}", formatter.format_progress(progress));
        }
    }
}

/// Saves the job receipt, warning instead of failing.
pub async fn save_receipt(job: &Job) {
    let path = default_receipt_path();
    if let Err(e) = JobReceipt::new(job.clone()).save(&path).await {
        warn!(error = %e, path = %path.display(), "Could not save job receipt");
    }
}

/// Resolves the job to work on: the given id, or the last submitted job.
///
/// When the id matches the receipt, the receipt's keyword is kept.
pub async fn resolve_job(job_id: Option<&str>, settings: &SearchSettings) -> Result<Job> {
    let receipt = JobReceipt::load(&default_receipt_path()).await;

    match job_id.map(str::trim) {
        Some("") => anyhow::bail!("job id is empty"),
        Some(id) => match receipt {
            Ok(receipt) if receipt.job.id.as_str() == id => Ok(receipt.job),
            _ => Ok(Job::new(
                JobId::new(id),
                "",
                &settings.api.location,
                &settings.api.language,
            )),
        },
        None => {
            let receipt = receipt.context("no job id given and no previous submission found")?;
            Ok(receipt.job)
        }
    }
}

/// Turns a configured display limit into a snapshot limit; `0` means all.
pub fn display_limit(limit: usize) -> Option<usize> {
    (limit > 0).then_some(limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_args_override() {
        let mut settings = SearchSettings::default();
        let args = PollArgs {
            max_attempts: Some(0),
            interval: Some(1),
            threshold: None,
        };
        args.apply(&mut settings);

        assert_eq!(settings.poll.max_attempts, 1);
        assert_eq!(settings.poll.interval, Duration::from_secs(1));
        assert_eq!(settings.poll.ready_threshold, 10);
    }

    #[test]
    fn test_parse_policy() {
        assert_eq!(parse_policy("last"), Ok(UnpricedPolicy::Last));
        assert!(parse_policy("first").is_err());
    }

    #[test]
    fn test_display_limit() {
        assert_eq!(display_limit(3), Some(3));
        assert_eq!(display_limit(0), None);
    }
}
