//! Logging init: file under XDG state dir, or stderr when that fails.

use std::fs;
use std::sync::Mutex;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

fn default_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,bulkdl=debug"))
}

/// Initialize structured logging to `~/.local/state/bulkdl/bulkdl.log`.
/// Errors (state dir unwritable) leave no subscriber installed; the caller
/// falls back to [`init_logging_stderr`].
pub fn init_logging() -> Result<()> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("bulkdl")?;
    let log_dir = xdg_dirs.get_state_home().join("bulkdl");
    fs::create_dir_all(&log_dir)?;
    let log_path = log_dir.join("bulkdl.log");

    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    tracing_subscriber::fmt()
        .with_env_filter(default_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    tracing::info!("logging to {}", log_path.display());
    Ok(())
}

/// Stderr-only logging, for when the log file cannot be opened.
pub fn init_logging_stderr() {
    tracing_subscriber::fmt()
        .with_env_filter(default_filter())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}
