//! curl-based transfer agent: one subprocess per job.
//!
//! Writes to the `.part` marker and renames to the final name on a clean
//! exit, so the supervisor's completion rule (marker gone, final present)
//! holds. The effective URL after redirects is checked against
//! restricted-page patterns; landing there means the account was throttled
//! and whatever was saved is the restriction page, not media.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use anyhow::{Context, Result};

use super::{marker_path, AgentStatus, TransferAgent, TransferHandle, MARKER_SUFFIX};

/// Path substrings that mark a redirect to a restricted-access page.
const RESTRICTED_PATTERNS: &[&str] = &["/register", "/premium"];

/// Spawns `curl` with resume and redirect-following enabled.
#[derive(Debug, Clone)]
pub struct CurlAgent {
    retries: u32,
}

impl CurlAgent {
    pub fn new() -> Self {
        Self { retries: 3 }
    }
}

impl Default for CurlAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl TransferAgent for CurlAgent {
    fn start(&self, source: &str, final_path: &Path) -> Result<Box<dyn TransferHandle>> {
        let marker = marker_path(final_path, MARKER_SUFFIX);
        let child = Command::new("curl")
            .arg("-fsL")
            .arg("--retry")
            .arg(self.retries.to_string())
            .arg("-C")
            .arg("-")
            .arg("-o")
            .arg(&marker)
            // Print the post-redirect URL so we can spot restriction pages.
            .arg("-w")
            .arg("%{url_effective}")
            .arg(source)
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("spawn curl for {source}"))?;
        tracing::debug!(source, target = %final_path.display(), "curl transfer started");
        Ok(Box::new(CurlHandle {
            child,
            marker,
            final_path: final_path.to_path_buf(),
            terminal: None,
        }))
    }
}

struct CurlHandle {
    child: Child,
    marker: PathBuf,
    final_path: PathBuf,
    terminal: Option<AgentStatus>,
}

impl CurlHandle {
    /// Reads the `-w %{url_effective}` output. The pipe is closed once the
    /// process has exited, so this does not block.
    fn effective_url(&mut self) -> String {
        let mut out = String::new();
        if let Some(mut stdout) = self.child.stdout.take() {
            let _ = stdout.read_to_string(&mut out);
        }
        out.trim().to_string()
    }
}

impl Drop for CurlHandle {
    fn drop(&mut self) {
        // A supervisor abandoning a live transfer (stall, queue error) must
        // not leak the process. The marker stays for `-C -` resume on rerun.
        if self.terminal.is_none() {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

impl TransferHandle for CurlHandle {
    fn poll(&mut self) -> Result<AgentStatus> {
        if let Some(status) = self.terminal {
            return Ok(status);
        }
        let Some(exit) = self.child.try_wait().context("wait on curl")? else {
            return Ok(AgentStatus::Running);
        };

        let effective = self.effective_url().to_ascii_lowercase();
        let status = if RESTRICTED_PATTERNS.iter().any(|p| effective.contains(p)) {
            // What curl saved is the restriction page, not media.
            let _ = fs::remove_file(&self.marker);
            tracing::warn!(url = %effective, "redirected to a restricted page");
            AgentStatus::RateLimited
        } else if exit.success() {
            if self.marker.exists() {
                fs::rename(&self.marker, &self.final_path)
                    .with_context(|| format!("finalize {}", self.final_path.display()))?;
            }
            AgentStatus::Exited(0)
        } else {
            AgentStatus::Exited(exit.code().unwrap_or(-1))
        };
        self.terminal = Some(status);
        Ok(status)
    }
}
