//! Pre-admission duplicate filtering.
//!
//! One directory listing per batch, taken before any transfer starts. The
//! comparison is case-insensitive, and partial-transfer markers count as
//! present under their final name so an interrupted run is not re-downloaded
//! on top of. Excluded jobs become `SKIPPED`, never silently dropped.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::job::{Job, JobStatus};

/// Case-insensitive snapshot of the filenames in the target directory.
pub struct DedupFilter {
    existing: HashSet<String>,
}

impl DedupFilter {
    /// Takes the one-time snapshot. The listing is not re-checked per item;
    /// nothing else writes to the directory during a batch.
    pub fn snapshot(target_dir: &Path, marker_suffix: &str) -> Result<Self> {
        let suffix = marker_suffix.to_lowercase();
        let mut existing = HashSet::new();
        let entries = fs::read_dir(target_dir)
            .with_context(|| format!("list target directory {}", target_dir.display()))?;
        for entry in entries {
            let entry = entry.context("read target directory entry")?;
            let name = entry.file_name().to_string_lossy().to_lowercase();
            let marker_base = name
                .strip_suffix(&suffix)
                .filter(|base| !base.is_empty())
                .map(str::to_string);
            match marker_base {
                Some(base) => existing.insert(base),
                None => existing.insert(name),
            };
        }
        Ok(Self { existing })
    }

    /// Whether a final filename is already present (case-insensitive).
    pub fn contains(&self, filename: &str) -> bool {
        self.existing.contains(&filename.to_lowercase())
    }

    /// Marks jobs whose target filename is already present, or repeated
    /// within the batch, as `SKIPPED`. Returns the number skipped. Every
    /// candidate stays in `jobs` so the summary accounts for all of them.
    pub fn apply(&self, jobs: &mut [Job]) -> usize {
        let mut seen_in_batch: HashSet<String> = HashSet::new();
        let mut skipped = 0;
        for job in jobs.iter_mut() {
            let Some(name) = job.target_path.file_name() else {
                continue;
            };
            let name = name.to_string_lossy().to_lowercase();
            if self.existing.contains(&name) || !seen_in_batch.insert(name) {
                job.status = JobStatus::Skipped;
                skipped += 1;
            }
        }
        skipped
    }
}
