//! Candidate and job value objects for one batch.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::url_model;

/// File-type tag candidates are filtered to. The site only serves these two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaExt {
    Mkv,
    Mp4,
}

impl MediaExt {
    pub const ALL: [MediaExt; 2] = [MediaExt::Mkv, MediaExt::Mp4];

    pub fn as_str(self) -> &'static str {
        match self {
            MediaExt::Mkv => "mkv",
            MediaExt::Mp4 => "mp4",
        }
    }

    /// Parses a tag case-insensitively. `None` for anything outside the set.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "mkv" => Some(MediaExt::Mkv),
            "mp4" => Some(MediaExt::Mp4),
            _ => None,
        }
    }
}

impl fmt::Display for MediaExt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A discovered downloadable item before admission.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// Fully-qualified location to retrieve from.
    pub source: String,
    /// Inferred final filename, already normalized to the requested extension.
    pub filename: String,
    pub ext: MediaExt,
}

impl Candidate {
    /// Builds a candidate from a raw URL, or `None` when the URL does not
    /// point at the requested extension.
    pub fn from_url(source: &str, ext: MediaExt) -> Option<Self> {
        if !url_model::url_matches_extension(source, ext) {
            return None;
        }
        Some(Self {
            source: source.to_string(),
            filename: url_model::infer_target_filename(source, ext),
            ext,
        })
    }
}

/// Lifecycle status of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Running,
    Done,
    Failed,
    Paused,
    Skipped,
}

impl JobStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Done => "done",
            JobStatus::Failed => "failed",
            JobStatus::Paused => "paused",
            JobStatus::Skipped => "skipped",
        }
    }

    /// Terminal for the batch: nothing in this state is polled again.
    pub fn is_terminal(self) -> bool {
        !matches!(self, JobStatus::Pending | JobStatus::Running)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One file to retrieve. Mutated only by the admission queue and the
/// supervisor bound to it; retained until the batch ends for the summary.
#[derive(Debug, Clone)]
pub struct Job {
    /// Stable identifier derived from the filename.
    pub id: String,
    pub source: String,
    /// Absolute destination path, including the filename.
    pub target_path: PathBuf,
    pub ext: MediaExt,
    pub status: JobStatus,
    /// Last observed on-disk size. Progress reporting only, never correctness.
    pub bytes_observed: u64,
    /// Diagnostic set when the job fails.
    pub error: Option<String>,
}

impl Job {
    pub fn from_candidate(candidate: &Candidate, target_dir: &Path) -> Self {
        Self {
            id: candidate.filename.to_lowercase(),
            source: candidate.source.clone(),
            target_path: target_dir.join(&candidate.filename),
            ext: candidate.ext,
            status: JobStatus::Pending,
            bytes_observed: 0,
            error: None,
        }
    }

    pub(crate) fn fail(&mut self, reason: impl Into<String>) {
        self.status = JobStatus::Failed;
        self.error = Some(reason.into());
    }
}

/// Builds jobs in bulk, in discovery order, before any admission occurs.
pub fn build_jobs(candidates: &[Candidate], target_dir: &Path) -> Vec<Job> {
    candidates
        .iter()
        .map(|c| Job::from_candidate(c, target_dir))
        .collect()
}
