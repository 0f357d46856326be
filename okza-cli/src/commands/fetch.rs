//! Fetch command - one status request, ranked, for an existing job.
//!
//! Nothing is written to the history.

use anyhow::Result;
use clap::Args;
use okza_core::UnpricedPolicy;
use okza_fetch::SearchPipeline;

use super::{ExportArgs, load_config, open_session, parse_policy, resolve_job};
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, ExitCode, OutputFormat};

/// Arguments for the fetch command.
#[derive(Args)]
pub struct FetchArgs {
    /// Job id; defaults to the last submitted job.
    pub job_id: Option<String>,

    #[command(flatten)]
    pub export: ExportArgs,

    /// Where items without a usable price rank: as-zero or last.
    #[arg(long, value_parser = parse_policy)]
    pub unpriced: Option<UnpricedPolicy>,
}

/// Runs the fetch command.
pub async fn run(args: &FetchArgs, cli: &Cli) -> Result<ExitCode> {
    let config = load_config(cli)?;
    let mut settings = config.to_search_settings();
    if let Some(policy) = args.unpriced {
        settings.unpriced = policy;
    }

    let session = open_session()?;
    let job = resolve_job(args.job_id.as_deref(), &settings).await?;
    let pipeline = SearchPipeline::from_settings(settings)?;

    let (status, results) = pipeline.fetch_ranked(&session, &job.id).await?;

    match cli.format {
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format_fetched(&job, status, &results)?);
        }
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            if !cli.quiet {
                eprintln!("{}", formatter.format_job(&job));
            }
            let label = if job.keyword.is_empty() {
                job.id.as_str()
            } else {
                job.keyword.as_str()
            };
            println!("{}", formatter.format_results(label, &results));
        }
    }

    args.export.write(&job.keyword, &results.items)?;

    Ok(ExitCode::Success)
}
