//! Tracing setup: a per-run log file inside the target directory.

use anyhow::Context;
use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter; defaults to `debug`.
pub const LOG_ENV: &str = "VASFA_LOG";

/// Initialize the tracing subscriber, truncating `log_path` for this run.
pub fn init_logging(log_path: &Path) -> anyhow::Result<()> {
    let file = File::create(log_path)
        .with_context(|| format!("could not create log file {}", log_path.display()))?;
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
        .context("could not install tracing subscriber")
}
