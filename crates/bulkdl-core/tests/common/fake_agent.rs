//! Scripted transfer agent for queue tests.
//!
//! Simulates marker/artifact transitions on a real directory so supervisors
//! observe genuine filesystem state, and tracks how many transfers are in
//! flight so tests can assert the concurrency ceiling.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use bulkdl_core::transfer::{
    marker_path, AgentStatus, TransferAgent, TransferHandle, MARKER_SUFFIX,
};

/// What the fake agent does for a given source.
#[derive(Debug, Clone)]
pub enum Script {
    /// Grow the marker over `growth_polls` polls, then finalize and exit 0.
    Succeed { bytes: u64, growth_polls: u32 },
    /// Exit with a non-zero code after `polls` polls, marker left behind.
    ExitNonZero { code: i32, polls: u32 },
    /// Report a restricted-page redirect after `polls` polls.
    RateLimit { polls: u32 },
    /// Never create anything; runs until the supervisor gives up.
    NeverStarts,
}

pub struct FakeAgent {
    default: Script,
    scripts: Mutex<HashMap<String, Script>>,
    started: AtomicUsize,
    active: Arc<AtomicUsize>,
    peak_active: Arc<AtomicUsize>,
}

impl FakeAgent {
    pub fn new(default: Script) -> Self {
        Self {
            default,
            scripts: Mutex::new(HashMap::new()),
            started: AtomicUsize::new(0),
            active: Arc::new(AtomicUsize::new(0)),
            peak_active: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Overrides the script for one source URL.
    pub fn script(self, source: &str, script: Script) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(source.to_string(), script);
        self
    }

    /// Total transfers ever started.
    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneously in-flight transfers observed.
    pub fn peak_active(&self) -> usize {
        self.peak_active.load(Ordering::SeqCst)
    }
}

impl TransferAgent for FakeAgent {
    fn start(&self, source: &str, final_path: &Path) -> Result<Box<dyn TransferHandle>> {
        self.started.fetch_add(1, Ordering::SeqCst);
        let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_active.fetch_max(now_active, Ordering::SeqCst);

        let script = self
            .scripts
            .lock()
            .unwrap()
            .get(source)
            .cloned()
            .unwrap_or_else(|| self.default.clone());

        Ok(Box::new(FakeHandle {
            script,
            polls: 0,
            final_path: final_path.to_path_buf(),
            marker: marker_path(final_path, MARKER_SUFFIX),
            active: Arc::clone(&self.active),
            finished: false,
        }))
    }
}

struct FakeHandle {
    script: Script,
    polls: u32,
    final_path: PathBuf,
    marker: PathBuf,
    active: Arc<AtomicUsize>,
    finished: bool,
}

impl FakeHandle {
    fn finish(&mut self) {
        if !self.finished {
            self.finished = true;
            self.active.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

impl TransferHandle for FakeHandle {
    fn poll(&mut self) -> Result<AgentStatus> {
        if !self.finished {
            self.polls += 1;
        }
        match self.script {
            Script::Succeed {
                bytes,
                growth_polls,
            } => {
                if self.polls >= growth_polls {
                    fs::write(&self.final_path, vec![0u8; bytes as usize])?;
                    if self.marker.exists() {
                        fs::remove_file(&self.marker)?;
                    }
                    self.finish();
                    Ok(AgentStatus::Exited(0))
                } else {
                    let grown = bytes * u64::from(self.polls) / u64::from(growth_polls);
                    fs::write(&self.marker, vec![0u8; grown as usize])?;
                    Ok(AgentStatus::Running)
                }
            }
            Script::ExitNonZero { code, polls } => {
                if self.polls >= polls {
                    self.finish();
                    Ok(AgentStatus::Exited(code))
                } else {
                    fs::write(&self.marker, vec![0u8; self.polls as usize])?;
                    Ok(AgentStatus::Running)
                }
            }
            Script::RateLimit { polls } => {
                if self.polls >= polls {
                    self.finish();
                    Ok(AgentStatus::RateLimited)
                } else {
                    Ok(AgentStatus::Running)
                }
            }
            Script::NeverStarts => Ok(AgentStatus::Running),
        }
    }
}

impl Drop for FakeHandle {
    fn drop(&mut self) {
        self.finish();
    }
}
