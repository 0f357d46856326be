//! History command - show or clear the search ledger.

use anyhow::Result;
use clap::Args;
use okza_store::HistoryLedger;
use tracing::info;

use super::{display_limit, load_config};
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, ExitCode, OutputFormat};

/// Arguments for the history command.
#[derive(Args)]
pub struct HistoryArgs {
    /// Number of entries to show (0 shows all).
    #[arg(long, short, value_name = "N")]
    pub limit: Option<usize>,

    /// Remove the whole history.
    #[arg(long, conflicts_with = "limit")]
    pub clear: bool,
}

/// Runs the history command.
pub fn run(args: &HistoryArgs, cli: &Cli) -> Result<ExitCode> {
    let config = load_config(cli)?;
    let ledger = HistoryLedger::new(config.history.resolved_path());

    if args.clear {
        ledger.clear()?;
        info!(path = %ledger.path().display(), "History cleared");
        match cli.format {
            OutputFormat::Json => {
                let output = serde_json::json!({ "cleared": true });
                println!("{}", JsonFormatter::new(cli.pretty).format(&output)?);
            }
            OutputFormat::Text => println!("History cleared."),
        }
        return Ok(ExitCode::Success);
    }

    let limit = args.limit.map_or_else(|| config.history.limit(), display_limit);
    let entries = ledger.snapshot(limit)?;

    match cli.format {
        OutputFormat::Json => {
            println!("{}", JsonFormatter::new(cli.pretty).format_history(&entries)?);
        }
        OutputFormat::Text => {
            println!("{}", TextFormatter::new(!cli.no_color).format_history(&entries));
        }
    }

    Ok(ExitCode::Success)
}
