//! Census pipeline - Main Entry Point
//!
//! Cleans the census data, trains the salary classifier, scores data slices
//! and serves predictions over HTTP.

use clap::Parser;
use census_pipeline::cli::{
    cmd_clean, cmd_evaluate, cmd_predict, cmd_run, cmd_serve, cmd_train, Cli, Commands,
};
use census_pipeline::pipeline::Action;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "census_pipeline=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.pipeline_config();

    match cli.command {
        Some(Commands::Run { action }) => {
            cmd_run(action, &config)?;
        }
        Some(Commands::Clean) => {
            cmd_clean(&config)?;
        }
        Some(Commands::Train { scoring }) => {
            cmd_train(&config, &scoring)?;
        }
        Some(Commands::Evaluate) => {
            cmd_evaluate(&config)?;
        }
        Some(Commands::Predict { record }) => {
            cmd_predict(&config, &record)?;
        }
        Some(Commands::Serve { port, host }) => {
            cmd_serve(&config, host, port).await?;
        }
        None => {
            // Default: every stage, like `run --action combo`
            cmd_run(Action::Combo, &config)?;
        }
    }

    Ok(())
}
