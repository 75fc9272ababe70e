//! `bulkdl list` – dry run: show candidates and skip decisions.

use anyhow::Result;
use bulkdl_core::dedup::DedupFilter;
use bulkdl_core::transfer::MARKER_SUFFIX;
use std::path::Path;

use super::{gather_candidates, parse_ext};

pub fn run_list(file: &Path, target: &Path, ext: &str) -> Result<()> {
    let ext = parse_ext(ext)?;
    let candidates = gather_candidates(file, ext)?;
    if candidates.is_empty() {
        println!("No {ext} links found in {}.", file.display());
        return Ok(());
    }

    // A missing target directory just means nothing can be skipped yet.
    let filter = if target.is_dir() {
        Some(DedupFilter::snapshot(target, MARKER_SUFFIX)?)
    } else {
        None
    };

    println!("{:<6} {:<40} {}", "PLAN", "FILENAME", "SOURCE");
    let mut to_download = 0usize;
    for candidate in &candidates {
        let exists = filter
            .as_ref()
            .is_some_and(|f| f.contains(&candidate.filename));
        let plan = if exists {
            "skip"
        } else {
            to_download += 1;
            "get"
        };
        println!("{:<6} {:<40} {}", plan, candidate.filename, candidate.source);
    }
    println!(
        "{} candidate(s): {} to download, {} already present.",
        candidates.len(),
        to_download,
        candidates.len() - to_download
    );
    Ok(())
}
