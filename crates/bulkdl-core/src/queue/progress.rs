//! Progress events for display by the CLI collaborator.
//!
//! The queue sends these over an mpsc channel with `try_send`; a slow or
//! absent consumer never stalls scheduling.

use crate::job::JobStatus;

/// Snapshot of one job's observable state. Emitted on every status change
/// and once per scheduling tick for running jobs.
#[derive(Debug, Clone)]
pub struct ProgressEvent {
    /// Job identifier (derived from the target filename).
    pub job_id: String,
    pub status: JobStatus,
    /// Last observed on-disk size in bytes.
    pub bytes_observed: u64,
    /// Diagnostic for failed jobs.
    pub error: Option<String>,
}
