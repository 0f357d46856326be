//! Submit command - create a job without waiting for it.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use okza_fetch::SearchPipeline;
use okza_store::first_keyword;

use super::{load_config, open_session, save_receipt};
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, ExitCode, OutputFormat};

/// Arguments for the submit command.
#[derive(Args)]
pub struct SubmitArgs {
    /// Keyword to submit.
    #[arg(required_unless_present = "from_csv", conflicts_with = "from_csv")]
    pub keyword: Option<String>,

    /// Take the keyword from the first row of a CSV file with a `keyword` column.
    #[arg(long, value_name = "FILE")]
    pub from_csv: Option<PathBuf>,
}

/// Runs the submit command.
pub async fn run(args: &SubmitArgs, cli: &Cli) -> Result<ExitCode> {
    let keyword = match (&args.keyword, &args.from_csv) {
        (Some(keyword), _) => keyword.clone(),
        (None, Some(path)) => {
            first_keyword(path).with_context(|| format!("reading {}", path.display()))?
        }
        (None, None) => anyhow::bail!("a keyword or --from-csv is required"),
    };

    let config = load_config(cli)?;
    let session = open_session()?;
    let pipeline = SearchPipeline::from_settings(config.to_search_settings())?;

    let job = pipeline.submitter().submit(&session, &keyword).await?;
    save_receipt(&job).await;

    match cli.format {
        OutputFormat::Json => println!("{}", JsonFormatter::new(cli.pretty).format(&job)?),
        OutputFormat::Text if cli.quiet => println!("{}", job.id),
        OutputFormat::Text => {
            println!("{}", TextFormatter::new(!cli.no_color).format_job(&job));
        }
    }

    Ok(ExitCode::Success)
}
