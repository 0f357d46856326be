//! Search command - the full submit, wait, rank, record flow.

use anyhow::Result;
use clap::Args;
use okza_core::UnpricedPolicy;
use okza_fetch::{SearchOutcome, SearchPipeline};
use okza_store::HistoryLedger;
use tracing::{info, warn};

use super::{
    ExportArgs, PollArgs, display_limit, load_config, open_session, parse_policy,
    progress_printer, save_receipt,
};
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, ExitCode, OutputFormat};

/// Arguments for the search command.
#[derive(Args)]
pub struct SearchArgs {
    /// Keyword to search for.
    pub keyword: String,

    #[command(flatten)]
    pub poll: PollArgs,

    #[command(flatten)]
    pub export: ExportArgs,

    /// Where items without a usable price rank: as-zero or last.
    #[arg(long, value_parser = parse_policy)]
    pub unpriced: Option<UnpricedPolicy>,

    /// Do not record this search in the history.
    #[arg(long)]
    pub no_history: bool,

    /// History entries to show afterwards (0 shows all).
    #[arg(long, value_name = "N")]
    pub history_limit: Option<usize>,
}

/// Runs the search command.
pub async fn run(args: &SearchArgs, cli: &Cli) -> Result<ExitCode> {
    let config = load_config(cli)?;
    let mut settings = config.to_search_settings();
    args.poll.apply(&mut settings);
    if let Some(policy) = args.unpriced {
        settings.unpriced = policy;
    }

    let session = open_session()?;
    let pipeline = SearchPipeline::from_settings(settings)?;
    let ledger = HistoryLedger::new(config.history.resolved_path());

    info!(keyword = %args.keyword, "Starting search");
    let progress = progress_printer(cli);
    let report = if args.no_history {
        pipeline.run(&session, &args.keyword, progress).await?
    } else {
        pipeline
            .run_recorded(&session, &args.keyword, &ledger, progress)
            .await?
    };

    save_receipt(&report.job).await;

    let history = if report.has_items() && !args.no_history {
        let limit = args.history_limit.map_or_else(|| config.history.limit(), display_limit);
        match ledger.snapshot(limit) {
            Ok(entries) => Some(entries),
            Err(e) => {
                warn!(error = %e, "Could not read history");
                None
            }
        }
    } else {
        None
    };

    match cli.format {
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format_report(&report, history.as_deref())?);
        }
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            if !cli.quiet {
                eprintln!("{}", formatter.format_job(&report.job));
            }

            match &report.outcome {
                SearchOutcome::Ranked { results, .. } => {
                    println!("{}", formatter.format_results(&report.job.keyword, results));
                }
                SearchOutcome::TimedOut {
                    attempts,
                    last_status,
                } => {
                    eprintln!(
                        "{}",
                        formatter.format_timeout(&report.job, *attempts, last_status.items_count)
                    );
                }
                SearchOutcome::Cancelled { attempts } => {
                    eprintln!("{}", formatter.format_cancelled(*attempts));
                }
            }

            if let Some(err) = &report.history_error {
                eprintln!(
                    "{}",
                    formatter.format_warning(&format!("search was not recorded: {err}"))
                );
            }
            if let Some(entries) = &history {
                println!();
                println!("{}", formatter.format_history(entries));
            }
        }
    }

    if let Some(results) = report.outcome.results() {
        args.export.write(&report.job.keyword, &results.items)?;
    }

    Ok(match report.outcome {
        SearchOutcome::Ranked { .. } => ExitCode::Success,
        SearchOutcome::TimedOut { .. } => ExitCode::Timeout,
        SearchOutcome::Cancelled { .. } => ExitCode::Cancelled,
    })
}
