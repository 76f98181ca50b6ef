// Main entry point - Configuration, dependency injection and command dispatch
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::infrastructure::aws_quicksight::AwsQuickSightClient;
use crate::infrastructure::config::load_settings;
use crate::presentation::app_state::AppState;
use crate::presentation::cli::Cli;
use crate::presentation::handlers::{execute, plan};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Load and validate configuration before touching AWS
    let settings = load_settings()?;
    let plan = plan(&cli.command, &settings)?;

    // Create client (infrastructure layer) and services (application layer)
    let client = Arc::new(AwsQuickSightClient::from_env().await);
    let state = AppState::new(client, plan.poll_policy());

    let outcome = execute(&state, plan).await?;
    println!("{}", outcome);

    Ok(())
}
