//! Config command - manage configuration.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};
use okza_store::{Config, default_receipt_path};
use tracing::info;

use super::load_config;
use crate::output::JsonFormatter;
use crate::{Cli, ExitCode, OutputFormat};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the effective configuration.
    Show,

    /// Show configuration and data paths.
    Path,

    /// Write a configuration file with the defaults.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

/// Runs the config command.
pub fn run(args: &ConfigArgs, cli: &Cli) -> Result<ExitCode> {
    match &args.action {
        ConfigAction::Show => show_config(cli)?,
        ConfigAction::Path => show_paths(cli)?,
        ConfigAction::Init { force } => init_config(cli, *force)?,
    }
    Ok(ExitCode::Success)
}

fn config_path(cli: &Cli) -> PathBuf {
    cli.config.clone().unwrap_or_else(Config::default_path)
}

fn show_config(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;

    match cli.format {
        OutputFormat::Text => {
            println!("Okza Configuration");
            println!("{}", "─".repeat(40));
            println!();
            println!("API base URL:     {}", config.api.base_url);
            println!("Location:         {}", config.api.location);
            println!("Language:         {}", config.api.language);
            println!("Request timeout:  {}s", config.api.timeout_secs);
            println!();
            println!("Max attempts:     {}", config.polling.max_attempts);
            println!("Ready threshold:  {} items", config.polling.ready_threshold);
            println!("Poll interval:    {}s", config.polling.interval_secs);
            println!();
            println!("Unpriced items:   {}", config.ranking.unpriced.name());
            println!("History file:     {}", config.history.resolved_path().display());
            match config.history.limit() {
                Some(limit) => println!("History shown:    {limit}"),
                None => println!("History shown:    all"),
            }
        }
        OutputFormat::Json => {
            println!("{}", JsonFormatter::new(cli.pretty).format(&config)?);
        }
    }

    Ok(())
}

fn show_paths(cli: &Cli) -> Result<()> {
    let config_file = config_path(cli);
    let history_file = load_config(cli)?.history.resolved_path();
    let receipt_file = default_receipt_path();

    match cli.format {
        OutputFormat::Text => {
            println!("Okza Paths");
            println!("{}", "─".repeat(40));
            println!();
            println!("Config file:  {}", config_file.display());
            println!("History file: {}", history_file.display());
            println!("Last job:     {}", receipt_file.display());
        }
        OutputFormat::Json => {
            let paths = serde_json::json!({
                "config_file": config_file.display().to_string(),
                "history_file": history_file.display().to_string(),
                "receipt_file": receipt_file.display().to_string(),
            });
            println!("{}", JsonFormatter::new(cli.pretty).format(&paths)?);
        }
    }

    Ok(())
}

fn init_config(cli: &Cli, force: bool) -> Result<()> {
    let path = config_path(cli);

    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    Config::default().save_to(&path)?;
    info!(path = %path.display(), "Configuration initialised");

    if cli.format == OutputFormat::Text && !cli.quiet {
        println!("Wrote default configuration to {}", path.display());
    }

    Ok(())
}
