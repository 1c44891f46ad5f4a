//! Tracing setup for the zettelflow binary
//!
//! Logs go to stderr, filtered by `--log-level` / `--verbose` unless
//! `RUST_LOG` is set. When the configured logs directory exists, the same
//! events are also appended to `zettelflow.log` inside it.

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Name of the log file inside the logs directory
pub const LOG_FILE_NAME: &str = "zettelflow.log";

/// Build the event filter, preferring `RUST_LOG` when present
pub fn build_filter(level: LevelFilter) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()))
}

/// Install the global subscriber.
///
/// Returns the log file in use, if any.
pub fn init_logging(level: LevelFilter, logs_dir: Option<&Path>) -> Result<Option<PathBuf>> {
    let log_path = logs_dir
        .filter(|dir| dir.is_dir())
        .map(|dir| dir.join(LOG_FILE_NAME));

    let file_layer = match &log_path {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(true)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    let stderr_layer = fmt::layer()
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(build_filter(level))
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(log_path)
}
