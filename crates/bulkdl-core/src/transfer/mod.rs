//! External transfer agent capability.
//!
//! The engine never moves bytes itself. It hands a (source, target) pair to
//! an agent and then watches the filesystem: while the transfer is in flight
//! the agent writes to a marker path next to the final name, and the final
//! artifact appears (marker gone) only when the bytes are complete. The trait
//! split keeps the queue testable without spawning real processes.

mod curl;
mod supervisor;

pub use curl::CurlAgent;
pub use supervisor::{TransferOutcome, TransferSupervisor};

use std::path::{Path, PathBuf};

use anyhow::Result;

/// Marker suffix used by the default agent (`file.mkv` → `file.mkv.part`).
pub const MARKER_SUFFIX: &str = ".part";

/// Marker path for a final artifact path.
pub fn marker_path(final_path: &Path, suffix: &str) -> PathBuf {
    let mut os = final_path.as_os_str().to_owned();
    os.push(suffix);
    PathBuf::from(os)
}

/// Result of a non-blocking poll on a transfer handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentStatus {
    /// Transfer still in flight.
    Running,
    /// Agent process finished with the given exit code.
    Exited(i32),
    /// Agent observed a restricted-page redirect; the transfer was abandoned.
    RateLimited,
}

/// Starts transfers. One agent serves a whole batch.
pub trait TransferAgent: Send + Sync {
    /// Begins one transfer. The agent must write in-progress bytes to
    /// `marker_path(final_path, self.marker_suffix())` and make the final
    /// artifact appear under `final_path` only once the bytes are complete.
    fn start(&self, source: &str, final_path: &Path) -> Result<Box<dyn TransferHandle>>;

    /// Marker suffix this agent uses while a transfer is in flight.
    fn marker_suffix(&self) -> &'static str {
        MARKER_SUFFIX
    }
}

/// Handle to one in-flight transfer. Polling must never block.
pub trait TransferHandle: Send {
    /// Checks agent status; may perform finalization work on exit. Safe to
    /// call again after a terminal status has been returned.
    fn poll(&mut self) -> Result<AgentStatus>;
}
