//! Tracing setup.
//!
//! The terminal is owned by the UI, so all log output goes to a file through
//! a non-blocking writer.  `RUST_LOG` overrides the configured level.

use std::path::Path;

use anyhow::{anyhow, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::LogLevel;

/// Install the global subscriber.
///
/// Keep the returned guard alive for the life of the program; dropping it
/// flushes and stops the writer.
pub fn init(log_file: &Path, level: LogLevel) -> Result<WorkerGuard> {
    let directory = log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = log_file
        .file_name()
        .ok_or_else(|| anyhow!("log file path `{}` has no file name", log_file.display()))?;

    let appender = tracing_appender::rolling::never(directory, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))?;

    Ok(guard)
}

fn default_directive(level: LogLevel) -> String {
    format!("warn,{}={}", env!("CARGO_CRATE_NAME"), level.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_directive_scopes_level_to_this_crate() {
        let directive = default_directive(LogLevel::Debug);
        assert_eq!(directive, "warn,latest_post_stats=debug");
        assert!(EnvFilter::try_new(&directive).is_ok());
    }
}
