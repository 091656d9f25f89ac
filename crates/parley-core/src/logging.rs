//! File logging.
//!
//! The interactive UI owns the terminal, so log output always goes to a file
//! through a non-blocking writer. Keep the returned guard alive until exit or
//! buffered lines are lost.

use std::fs::{self, OpenOptions};
use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::Config;

/// Environment variable holding an `EnvFilter` directive.
pub const LOG_ENV: &str = "PARLEY_LOG";

/// Flushes pending log lines when dropped.
pub struct LogGuard {
    _guard: WorkerGuard,
}

/// Installs the global subscriber writing to the configured log file.
///
/// # Errors
/// Returns an error if the filter is invalid, the log file cannot be opened,
/// or a global subscriber is already installed.
pub fn init(config: &Config) -> Result<LogGuard> {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(&config.log.level))
        .with_context(|| format!("Invalid log level '{}'", config.log.level))?;

    init_with_filter(&config.log_file(), filter)
}

fn init_with_filter(path: &Path, filter: EnvFilter) -> Result<LogGuard> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init()
        .context("Failed to install log subscriber")?;

    Ok(LogGuard { _guard: guard })
}
