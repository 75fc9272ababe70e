//! Completion detection for one active transfer.
//!
//! The supervisor never compares byte counts against a declared content
//! length; a transfer is complete exactly when the marker is gone and the
//! final artifact is present. Agent exit codes and an inactivity bound cover
//! the failure side.

use std::path::{Path, PathBuf};

use anyhow::Result;

use super::{marker_path, AgentStatus, TransferAgent, TransferHandle};

/// Terminal outcome reported back to the admission queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome {
    /// Marker gone, final artifact present.
    Done { bytes: u64 },
    /// Agent exited abnormally, or nothing grew within the inactivity bound.
    Failed { reason: String },
    /// Agent hit a restricted-page redirect; the job is abandoned, not failed.
    RateLimited,
}

/// Owns the lifecycle of one transfer: the agent handle plus the watched
/// marker and final paths. Exactly one supervisor exists per running job.
pub struct TransferSupervisor {
    handle: Box<dyn TransferHandle>,
    final_path: PathBuf,
    marker: PathBuf,
    last_size: u64,
    idle_polls: u32,
    stall_poll_limit: u32,
    agent_exited: bool,
}

impl TransferSupervisor {
    /// Starts the agent for one job and begins watching its target path.
    pub fn start(
        agent: &dyn TransferAgent,
        source: &str,
        final_path: &Path,
        stall_poll_limit: u32,
    ) -> Result<Self> {
        let handle = agent.start(source, final_path)?;
        Ok(Self {
            handle,
            marker: marker_path(final_path, agent.marker_suffix()),
            final_path: final_path.to_path_buf(),
            last_size: 0,
            idle_polls: 0,
            stall_poll_limit,
            agent_exited: false,
        })
    }

    /// Last observed on-disk size (marker or final artifact).
    pub fn bytes_observed(&self) -> u64 {
        self.last_size
    }

    /// One poll cycle: agent status first, then filesystem state. Returns
    /// `Some` on a terminal outcome; the caller releases the slot then.
    pub fn poll(&mut self) -> Result<Option<TransferOutcome>> {
        if !self.agent_exited {
            match self.handle.poll()? {
                AgentStatus::Running => {}
                AgentStatus::RateLimited => return Ok(Some(TransferOutcome::RateLimited)),
                AgentStatus::Exited(0) => self.agent_exited = true,
                AgentStatus::Exited(code) => {
                    return Ok(Some(TransferOutcome::Failed {
                        reason: format!("transfer agent exited with code {code}"),
                    }));
                }
            }
        }

        let marker_size = file_size(&self.marker);
        let final_size = file_size(&self.final_path);

        // The completion rule: final artifact present, marker gone.
        if let (Some(bytes), None) = (final_size, marker_size) {
            self.last_size = bytes;
            return Ok(Some(TransferOutcome::Done { bytes }));
        }

        let observed = marker_size.or(final_size).unwrap_or(0);
        if observed > self.last_size {
            self.last_size = observed;
            self.idle_polls = 0;
        } else {
            self.idle_polls += 1;
        }

        if self.idle_polls >= self.stall_poll_limit {
            let reason = if self.agent_exited {
                "agent exited cleanly but the artifact never appeared".to_string()
            } else if marker_size.is_none() {
                format!("no artifact appeared after {} polls", self.idle_polls)
            } else {
                format!("no size growth after {} polls", self.idle_polls)
            };
            return Ok(Some(TransferOutcome::Failed { reason }));
        }
        Ok(None)
    }
}

fn file_size(path: &Path) -> Option<u64> {
    std::fs::metadata(path).ok().map(|m| m.len())
}
