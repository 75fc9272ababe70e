//! Terminal batch summary.

use std::fmt;

use crate::job::{Job, JobStatus};

/// Counts per final status plus the jobs a rerun needs to know about.
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    pub total: usize,
    pub done: usize,
    pub failed: usize,
    pub paused: usize,
    pub skipped: usize,
    /// (job id, diagnostic) for every failed job.
    pub failed_jobs: Vec<(String, String)>,
    pub paused_jobs: Vec<String>,
    pub skipped_jobs: Vec<String>,
}

impl BatchSummary {
    /// Builds the summary from a finished batch.
    pub fn from_jobs(jobs: &[Job]) -> Self {
        let mut summary = Self {
            total: jobs.len(),
            ..Self::default()
        };
        for job in jobs {
            match job.status {
                JobStatus::Done => summary.done += 1,
                JobStatus::Failed => {
                    summary.failed += 1;
                    let reason = job.error.clone().unwrap_or_else(|| "unknown".to_string());
                    summary.failed_jobs.push((job.id.clone(), reason));
                }
                JobStatus::Paused => {
                    summary.paused += 1;
                    summary.paused_jobs.push(job.id.clone());
                }
                JobStatus::Skipped => {
                    summary.skipped += 1;
                    summary.skipped_jobs.push(job.id.clone());
                }
                JobStatus::Pending | JobStatus::Running => {}
            }
        }
        summary
    }

    /// True when every candidate ended in a terminal state.
    pub fn accounts_for(&self, candidates: usize) -> bool {
        self.total == candidates
            && self.done + self.failed + self.paused + self.skipped == self.total
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Batch summary ({} candidates):", self.total)?;
        writeln!(f, "  done:    {}", self.done)?;
        writeln!(f, "  failed:  {}", self.failed)?;
        writeln!(f, "  paused:  {}", self.paused)?;
        writeln!(f, "  skipped: {}", self.skipped)?;
        if !self.skipped_jobs.is_empty() {
            writeln!(f, "Skipped (already present):")?;
            for id in &self.skipped_jobs {
                writeln!(f, "  {id}")?;
            }
        }
        if !self.failed_jobs.is_empty() {
            writeln!(f, "Failed:")?;
            for (id, reason) in &self.failed_jobs {
                writeln!(f, "  {id}: {reason}")?;
            }
        }
        if !self.paused_jobs.is_empty() {
            writeln!(f, "Paused (rerun to resume):")?;
            for id in &self.paused_jobs {
                writeln!(f, "  {id}")?;
            }
        }
        Ok(())
    }
}
