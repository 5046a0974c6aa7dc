//! CLI entry point for the firmware feed mirror.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use firmware_fetch::{RunConfig, app};
use tracing::{debug, error, info};

mod cli;

use cli::Args;

/// Exit code for malformed invocations and aborted runs.
const EXIT_FAILURE: u8 = 1;

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::from(EXIT_FAILURE)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    // RUST_LOG overrides the default level
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    debug!(?args, "CLI arguments parsed");
    let config = args.into_config();

    match execute(&config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

async fn execute(config: &RunConfig) -> Result<()> {
    if config.dry_run {
        let plan = app::plan(config)
            .await
            .context("dry run aborted")?;
        app::print_plan(&plan);
        return Ok(());
    }

    info!(feed = %config.feed_url, "firmware mirror starting");
    let report = app::run(config).await.context("run aborted")?;

    // Per-artifact failures were already logged and do not change the exit code.
    debug!(
        downloaded = report.downloaded(),
        already_existing = report.already_existing(),
        failed = report.failed(),
        "run finished"
    );
    Ok(())
}
