//! Status command - poll an existing job until it is ready.

use anyhow::Result;
use clap::Args;
use okza_fetch::{PollOutcome, SearchPipeline};

use super::{PollArgs, load_config, open_session, progress_printer, resolve_job};
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, ExitCode, OutputFormat};

/// Arguments for the status command.
#[derive(Args)]
pub struct StatusArgs {
    /// Job id; defaults to the last submitted job.
    pub job_id: Option<String>,

    #[command(flatten)]
    pub poll: PollArgs,
}

/// Runs the status command.
pub async fn run(args: &StatusArgs, cli: &Cli) -> Result<ExitCode> {
    let config = load_config(cli)?;
    let mut settings = config.to_search_settings();
    args.poll.apply(&mut settings);

    let session = open_session()?;
    let job = resolve_job(args.job_id.as_deref(), &settings).await?;
    let pipeline = SearchPipeline::from_settings(settings)?;

    let outcome = pipeline
        .monitor()
        .poll(&session, &job.id, progress_printer(cli))
        .await?;

    match cli.format {
        OutputFormat::Json => {
            println!("{}", JsonFormatter::new(cli.pretty).format_poll(&job.id, &outcome)?);
        }
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            match &outcome {
                PollOutcome::Ready { status, .. } => {
                    println!(
                        "Job {} is ready with {} items. Run `okza fetch {}` to rank them.",
                        job.id, status.items_count, job.id
                    );
                }
                PollOutcome::TimedOut {
                    attempts,
                    last_status,
                } => {
                    eprintln!(
                        "{}",
                        formatter.format_timeout(&job, *attempts, last_status.items_count)
                    );
                }
                PollOutcome::Cancelled { attempts } => {
                    eprintln!("{}", formatter.format_cancelled(*attempts));
                }
            }
        }
    }

    Ok(match outcome {
        PollOutcome::Ready { .. } => ExitCode::Success,
        PollOutcome::TimedOut { .. } => ExitCode::Timeout,
        PollOutcome::Cancelled { .. } => ExitCode::Cancelled,
    })
}
