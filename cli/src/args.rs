//! Command line surface.

use clap::{ArgAction, Parser};
use std::path::PathBuf;

use crate::config::{Config, ConfigError};

#[derive(Debug, Parser)]
#[command(
    name = "txnstats",
    about = "Report queue depths and in-flight transaction states of a MongoDB transaction layer"
)]
pub struct Cli {
    /// Hostname of the MongoDB server.
    #[arg(long, env = "TXNSTATS_HOSTNAME")]
    pub hostname: Option<String>,

    /// Port of the MongoDB server.
    #[arg(long, env = "TXNSTATS_PORT")]
    pub port: Option<u16>,

    /// Use TLS to connect to MongoDB. A bare `--ssl` means true.
    #[arg(
        long,
        env = "TXNSTATS_SSL",
        action = ArgAction::Set,
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    pub ssl: Option<bool>,

    /// User for connecting to MongoDB (use "" for no authentication).
    #[arg(long, env = "TXNSTATS_USERNAME")]
    pub username: Option<String>,

    /// Password for connecting to MongoDB.
    #[arg(long, env = "TXNSTATS_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Database holding the transaction collections.
    #[arg(long, env = "TXNSTATS_DATABASE")]
    pub database: Option<String>,

    /// Collection scans allowed to run at the same time.
    #[arg(long, env = "TXNSTATS_CONCURRENCY")]
    pub concurrency: Option<usize>,

    /// Documents fetched per cursor round trip.
    #[arg(long, env = "TXNSTATS_BATCH_SIZE")]
    pub batch_size: Option<u32>,

    /// Abort the scan after this many seconds.
    #[arg(long, env = "TXNSTATS_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Seconds to wait for the server when connecting.
    #[arg(long, env = "TXNSTATS_CONNECT_TIMEOUT")]
    pub connect_timeout: Option<u64>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "TXNSTATS_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "TXNSTATS_LOG_FORMAT")]
    pub log_format: Option<String>,

    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Build the validated run configuration: file (if any), then flags.
    pub fn into_config(self) -> Result<Config, ConfigError> {
        let mut config = match &self.config {
            Some(path) => Config::from_toml_file(path)?,
            None => Config::default(),
        };
        self.apply(&mut config);
        config.validate()?;
        Ok(config)
    }

    fn apply(self, config: &mut Config) {
        if let Some(hostname) = self.hostname {
            config.hostname = hostname;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(ssl) = self.ssl {
            config.ssl = ssl;
        }
        if let Some(username) = self.username {
            config.username = username;
        }
        if let Some(password) = self.password {
            config.password = password;
        }
        if let Some(database) = self.database {
            config.database = database;
        }
        if let Some(concurrency) = self.concurrency {
            config.concurrency = concurrency;
        }
        if let Some(batch_size) = self.batch_size {
            config.batch_size = batch_size;
        }
        if self.timeout.is_some() {
            config.timeout_secs = self.timeout;
        }
        if let Some(connect_timeout) = self.connect_timeout {
            config.connect_timeout_secs = connect_timeout;
        }
        if let Some(log_level) = self.log_level {
            config.log_level = log_level;
        }
        if let Some(log_format) = self.log_format {
            config.log_format = log_format;
        }
    }
}
