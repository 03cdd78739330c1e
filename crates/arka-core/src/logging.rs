//! Diagnostic logging
//!
//! The terminal belongs to the UI, so logs go to a daily rolling JSON file
//! instead of stderr.

use std::path::PathBuf;

use anyhow::{Result, anyhow};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Directory holding `arka.log.*` files
pub fn log_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_local_dir()
        .ok_or_else(|| anyhow!("Could not determine data directory"))?;

    Ok(data_dir.join("arka").join("logs"))
}

/// Build the filter from `RUST_LOG` if set, else from the configured level
fn build_env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber. Keep the returned guard alive until exit or
/// buffered lines are lost.
pub fn init_logging(level: &str) -> Result<WorkerGuard> {
    let log_dir = log_dir()?;
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::daily(log_dir, "arka.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    Registry::default()
        .with(build_env_filter(level))
        .with(fmt::layer().json().with_writer(non_blocking))
        .try_init()
        .map_err(|e| anyhow!("Failed to install log subscriber: {}", e))?;

    Ok(guard)
}
