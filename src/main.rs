//! CLI entry point: load config, run the migration, print the report.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::process::ExitCode;
use strat_migrate::{Error, MigrationConfig, MigrationRunner};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("migration.json"));

    info!(config = %config_path.display(), "loading migration config");
    let config = MigrationConfig::load(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;

    let runner = MigrationRunner::connect(config);
    match runner.run().await {
        Ok(report) => {
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(Error::Check(failure)) => {
            error!(%failure, "migration verification failed");
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e).context("migration run failed"),
    }
}
