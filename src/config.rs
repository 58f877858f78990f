//! Command-line and environment configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use thiserror::Error;
use url::Url;

pub const DEFAULT_API_BASE: &str = "https://public-api.wordpress.com/rest/v1.1";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

/// A terminal card showing a site's latest post and how it is doing.
#[derive(Debug, Clone, Parser)]
#[command(name = "latest-post-stats", version, about)]
pub struct Config {
    /// Site to report on: numeric id or domain.
    #[arg(long, env = "WPSTATS_SITE")]
    pub site: String,

    /// OAuth bearer token for private sites.
    #[arg(long, env = "WPSTATS_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Base URL of the REST API.
    #[arg(long, env = "WPSTATS_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Seconds between automatic refreshes.
    #[arg(long, env = "WPSTATS_REFRESH_SECS", default_value_t = 300)]
    pub refresh_secs: u64,

    /// Where logs are written; the terminal belongs to the UI.
    #[arg(long, env = "WPSTATS_LOG_FILE", default_value = "latest-post-stats.log")]
    pub log_file: PathBuf,

    #[arg(long, env = "WPSTATS_LOG_LEVEL", value_enum, default_value = "info")]
    pub log_level: LogLevel,
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.site.trim().is_empty() {
            return Err(ConfigError::InvalidConfig("site must not be empty".into()));
        }
        if self.refresh_secs == 0 {
            return Err(ConfigError::InvalidConfig(
                "refresh interval must be at least one second".into(),
            ));
        }
        self.api_base_url()?;
        Ok(())
    }

    pub fn api_base_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.api_base)
            .map_err(|e| ConfigError::InvalidUrl(format!("{}: {e}", self.api_base)))?;
        if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl(format!(
                "{}: expected an http(s) base URL",
                self.api_base
            )));
        }
        Ok(url)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_secs)
    }
}
