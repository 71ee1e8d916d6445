//! evalbench - Main Entry Point
//!
//! Evaluates classifiers on a CSV dataset and writes a comparison report.

use clap::Parser;
use evalbench::cli::{cmd_info, cmd_run, Cli, Commands, RunArgs};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "evalbench=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Run(args)) => {
            cmd_run(args)?;
        }
        Some(Commands::Info { data }) => {
            cmd_info(&data)?;
        }
        None => {
            // Default: run with the default configuration
            cmd_run(RunArgs::default())?;
        }
    }

    Ok(())
}
