//! Run configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use txnstats_scan::{EngineConfig, DEFAULT_BATCH_SIZE, DEFAULT_CONCURRENCY};
use txnstats_store_mongo::{Credentials, DialInfo};
use txnstats_utils::LogFormat;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("--password must be used if --username is provided")]
    MissingPassword,

    #[error("concurrency must be at least 1")]
    ZeroConcurrency,

    #[error("batch size must be at least 1")]
    ZeroBatchSize,

    #[error("unknown log format {0:?} (expected \"human\" or \"json\")")]
    LogFormat(String),

    #[error("cannot read config file {}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config file")]
    Parse(#[from] toml::de::Error),
}

/// Configuration for one txnstats run.
///
/// Can be loaded from a TOML file via [`Config::from_toml_file`]; command
/// line flags and environment variables override file values.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Hostname of the MongoDB server.
    #[serde(default = "default_hostname")]
    pub hostname: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Connect over TLS (certificates are not validated).
    #[serde(default = "default_true")]
    pub ssl: bool,

    /// User to authenticate as; empty for no authentication.
    #[serde(default = "default_username")]
    pub username: String,

    #[serde(default)]
    pub password: String,

    /// Database holding the transaction collections.
    #[serde(default = "default_database")]
    pub database: String,

    /// Collection scans allowed to run at the same time.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Documents per cursor batch.
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,

    /// Give up on the scan after this many seconds.
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_log_format")]
    pub log_format: String,
}

fn default_hostname() -> String {
    "localhost".into()
}

fn default_port() -> u16 {
    37017
}

fn default_true() -> bool {
    true
}

fn default_username() -> String {
    "admin".into()
}

fn default_database() -> String {
    "juju".into()
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

fn default_batch_size() -> u32 {
    DEFAULT_BATCH_SIZE
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_log_level() -> String {
    "warn".into()
}

fn default_log_format() -> String {
    "human".into()
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Reject combinations that cannot work, before any network activity.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.username.is_empty() && self.password.is_empty() {
            return Err(ConfigError::MissingPassword);
        }
        if self.concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        if self.batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        self.log_format()?;
        Ok(())
    }

    pub fn log_format(&self) -> Result<LogFormat, ConfigError> {
        LogFormat::parse(&self.log_format).ok_or_else(|| ConfigError::LogFormat(self.log_format.clone()))
    }

    pub fn dial_info(&self) -> DialInfo {
        let credentials = (!self.username.is_empty()).then(|| Credentials {
            username: self.username.clone(),
            password: self.password.clone(),
        });
        DialInfo {
            host: self.hostname.clone(),
            port: self.port,
            credentials,
            tls: self.ssl,
            database: self.database.clone(),
            connect_timeout: Some(Duration::from_secs(self.connect_timeout_secs)),
        }
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            concurrency: self.concurrency,
            batch_size: self.batch_size,
            timeout: self.timeout_secs.map(Duration::from_secs),
            ..EngineConfig::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hostname: default_hostname(),
            port: default_port(),
            ssl: true,
            username: default_username(),
            password: String::new(),
            database: default_database(),
            concurrency: default_concurrency(),
            batch_size: default_batch_size(),
            timeout_secs: None,
            connect_timeout_secs: default_connect_timeout(),
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}
