// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! Okza CLI - merchant product search from the command line.
//!
//! # Examples
//!
//! ```bash
//! # Search, rank by price, and record the search
//! okza search "casque audio"
//!
//! # Export the ranked items
//! okza search "casque audio" --csv prices.csv --html prices.html
//!
//! # Submit only, then poll or fetch later
//! okza submit --from-csv mot-cle.csv
//! okza status
//! okza fetch
//!
//! # Recent searches
//! okza history --limit 10
//!
//! # JSON output
//! okza search "casque audio" --format json --pretty
//! ```

mod commands;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use okza_core::CoreError;
use okza_fetch::FetchError;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use commands::{config, fetch, history, search, status, submit};

// ============================================================================
// CLI Definition
// ============================================================================

/// Okza CLI - merchant product search.
#[derive(Parser)]
#[command(name = "okza")]
#[command(about = "Merchant product search with price ranking and search history")]
#[command(long_about = r#"
Okza submits a keyword to the merchant data provider, waits for the
asynchronous job to finish, ranks the product listings by price, and keeps
a log of past searches.

Credentials are read from PROVIDER_USERNAME and PROVIDER_PASSWORD
(DATAFORSEO_USERNAME / DATAFORSEO_PASSWORD are accepted too). A .env file
in the working directory is loaded first.

Examples:
  okza search "casque audio"        # Full search
  okza search kw --csv out.csv      # With CSV export
  okza submit --from-csv mot-cle.csv
  okza status                       # Poll the last submitted job
  okza history                      # Recent searches
"#)]
#[command(version)]
#[command(author = "Okza Contributors")]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Configuration file to use instead of the default.
    #[arg(long, global = true, env = "OKZA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (minimal output).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Search a keyword: submit, wait, rank, and record.
    #[command(visible_alias = "s")]
    Search(search::SearchArgs),

    /// Submit a job without waiting for it.
    Submit(submit::SubmitArgs),

    /// Poll an existing job until it is ready.
    Status(status::StatusArgs),

    /// Fetch and rank the current items of an existing job.
    Fetch(fetch::FetchArgs),

    /// Show or clear the search history.
    #[command(visible_alias = "h")]
    History(history::HistoryArgs),

    /// Manage configuration.
    Config(config::ConfigArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success.
    Success = 0,
    /// General error.
    Error = 1,
    /// Provider credentials are not set.
    CredentialsMissing = 2,
    /// The provider created no job.
    SubmissionFailed = 3,
    /// The job was not ready before polling gave up.
    Timeout = 4,
    /// Interrupted by the user.
    Cancelled = 5,
}

impl ExitCode {
    /// Picks the exit code for a failed command.
    pub fn for_error(err: &anyhow::Error) -> Self {
        for cause in err.chain() {
            if let Some(CoreError::CredentialMissing(_)) = cause.downcast_ref::<CoreError>() {
                return Self::CredentialsMissing;
            }
            match cause.downcast_ref::<FetchError>() {
                Some(FetchError::Core(CoreError::CredentialMissing(_))) => {
                    return Self::CredentialsMissing;
                }
                Some(FetchError::SubmissionFailed(_)) => return Self::SubmissionFailed,
                Some(FetchError::Cancelled) => return Self::Cancelled,
                _ => {}
            }
        }
        Self::Error
    }
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return;
    }

    let filter = if verbose {
        EnvFilter::new("okza=debug,info")
    } else {
        EnvFilter::new("okza=warn")
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() {
    // A missing .env file is fine.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let result: Result<ExitCode> = match &cli.command {
        Commands::Search(args) => search::run(args, &cli).await,
        Commands::Submit(args) => submit::run(args, &cli).await,
        Commands::Status(args) => status::run(args, &cli).await,
        Commands::Fetch(args) => fetch::run(args, &cli).await,
        Commands::History(args) => history::run(args, &cli),
        Commands::Config(args) => config::run(args, &cli),
    };

    let code = match result {
        Ok(code) => code,
        Err(e) => {
            if !cli.quiet {
                eprintln!("Error: {e:#}");
            }
            ExitCode::for_error(&e)
        }
    };

    std::process::exit(code as i32);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_search() {
        let cli = Cli::try_parse_from([
            "okza", "search", "casque audio", "--csv", "out.csv", "--format", "json",
        ])
        .unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(matches!(cli.command, Commands::Search(_)));
    }

    #[test]
    fn test_exit_codes_for_errors() {
        let missing = anyhow::Error::new(CoreError::CredentialMissing("PROVIDER_USERNAME".into()));
        assert_eq!(ExitCode::for_error(&missing), ExitCode::CredentialsMissing);

        let failed = anyhow::Error::new(FetchError::SubmissionFailed("no tasks".into()))
            .context("submitting job");
        assert_eq!(ExitCode::for_error(&failed), ExitCode::SubmissionFailed);

        let cancelled = anyhow::Error::new(FetchError::Cancelled);
        assert_eq!(ExitCode::for_error(&cancelled), ExitCode::Cancelled);

        assert_eq!(ExitCode::for_error(&anyhow::anyhow!("boom")), ExitCode::Error);
    }

    #[test]
    fn test_clap_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
