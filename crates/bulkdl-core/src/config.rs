//! Configuration: on-disk defaults plus per-batch validation.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Fatal configuration problems. These fire before any job is admitted.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("target directory {path}: {source}")]
    TargetDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Scheduling parameters for one batch.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Concurrency ceiling for simultaneous transfers.
    pub max_concurrent: usize,
    /// Scheduler tick cadence. Transfers run for minutes; seconds is plenty.
    pub poll_interval: Duration,
    /// Poll cycles with no size growth before a transfer is declared failed.
    pub stall_poll_limit: u32,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            max_concurrent: 2,
            poll_interval: Duration::from_secs(5),
            stall_poll_limit: 24,
        }
    }
}

impl BatchOptions {
    /// Rejects malformed parameters before any job starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrent == 0 {
            return Err(ConfigError::Invalid(
                "max_concurrent must be at least 1".to_string(),
            ));
        }
        if self.poll_interval.is_zero() {
            return Err(ConfigError::Invalid(
                "poll_interval must be positive".to_string(),
            ));
        }
        if self.stall_poll_limit == 0 {
            return Err(ConfigError::Invalid(
                "stall_poll_limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Global configuration loaded from `~/.config/bulkdl/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkdlConfig {
    /// Default concurrency ceiling (`-j` on the CLI overrides per run).
    pub max_concurrent: usize,
    /// Scheduler tick cadence in seconds.
    pub poll_interval_secs: f64,
    /// Poll cycles with no growth before a stalled transfer fails.
    pub stall_poll_limit: u32,
}

impl Default for BulkdlConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 2,
            poll_interval_secs: 5.0,
            stall_poll_limit: 24,
        }
    }
}

impl BulkdlConfig {
    pub fn batch_options(&self) -> BatchOptions {
        // Non-finite or negative values map to zero so `validate()` rejects
        // them; `Duration::from_secs_f64` would panic on them.
        let secs = if self.poll_interval_secs.is_finite() {
            self.poll_interval_secs.max(0.0)
        } else {
            0.0
        };
        BatchOptions {
            max_concurrent: self.max_concurrent,
            poll_interval: Duration::from_secs_f64(secs),
            stall_poll_limit: self.stall_poll_limit,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("bulkdl")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<BulkdlConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = BulkdlConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: BulkdlConfig = toml::from_str(&data)?;
    Ok(cfg)
}

/// Ensures the target directory exists, creating it if needed.
pub fn ensure_target_dir(path: &Path) -> Result<(), ConfigError> {
    fs::create_dir_all(path).map_err(|source| ConfigError::TargetDir {
        path: path.to_path_buf(),
        source,
    })
}
