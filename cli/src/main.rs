//! txnstats: point-in-time health report of a MongoDB transaction layer.
//!
//! Connects once, scans the transactional collections, prints the report
//! as JSON on stdout and exits. Exit status is 2 for configuration errors
//! and 1 for connection or scan failures.

mod args;
mod config;
mod output;

use anyhow::Context;
use clap::Parser;
use std::process::ExitCode;
use std::time::Instant;

use txnstats_scan::Engine;
use txnstats_utils::{format_duration, init_tracing};

use crate::args::Cli;
use crate::config::{Config, ConfigError};

/// Exit status for configuration errors, which are reported before any
/// network activity.
const EXIT_CONFIG: u8 = 2;
/// Exit status for connection and scan failures.
const EXIT_FAILURE: u8 = 1;

#[tokio::main]
async fn main() -> ExitCode {
    match start().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(exit_status(&e))
        }
    }
}

async fn start() -> anyhow::Result<()> {
    let config = Cli::parse().into_config()?;
    init_tracing(config.log_format()?, &config.log_level);
    run(&config).await
}

fn exit_status(err: &anyhow::Error) -> u8 {
    if err.chain().any(|cause| cause.is::<ConfigError>()) {
        EXIT_CONFIG
    } else {
        EXIT_FAILURE
    }
}

async fn run(config: &Config) -> anyhow::Result<()> {
    let started = Instant::now();
    let dial_info = config.dial_info();

    let store = txnstats_store_mongo::dial(&dial_info)
        .await
        .with_context(|| format!("cannot dial mongodb at {}", dial_info.addr()))?;

    let report = Engine::new(config.engine_config())
        .run(&store)
        .await
        .with_context(|| format!("cannot gather transaction stats from {:?}", store.database_name()))?;

    output::write_report(&mut std::io::stdout().lock(), &report)
        .context("cannot write report")?;

    tracing::info!(
        collections = report.collections.len(),
        queued = report.total_queued(),
        elapsed = %format_duration(started.elapsed()),
        "report written"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use txnstats_scan::ScanError;

    #[test]
    fn config_errors_exit_with_two() {
        let err = anyhow::Error::from(ConfigError::MissingPassword);
        assert_eq!(exit_status(&err), EXIT_CONFIG);

        let err = anyhow::Error::from(ConfigError::ZeroConcurrency).context("loading settings");
        assert_eq!(exit_status(&err), EXIT_CONFIG);
    }

    #[test]
    fn runtime_failures_exit_with_one() {
        let err = anyhow::Error::from(ScanError::Timeout(Duration::from_secs(5)))
            .context("cannot gather transaction stats from \"juju\"");
        assert_eq!(exit_status(&err), EXIT_FAILURE);

        let err = anyhow::anyhow!("cannot dial mongodb at localhost:37017");
        assert_eq!(exit_status(&err), EXIT_FAILURE);
    }
}
