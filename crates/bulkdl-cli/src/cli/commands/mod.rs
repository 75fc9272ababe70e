mod list;
mod probe;
mod run;

pub use list::run_list;
pub use run::run_batch;

use anyhow::Result;
use bulkdl_core::job::{Candidate, MediaExt};
use bulkdl_core::url_model;
use std::path::Path;

use super::linklist;

pub(super) fn parse_ext(ext: &str) -> Result<MediaExt> {
    MediaExt::parse(ext)
        .ok_or_else(|| anyhow::anyhow!("unsupported extension: {ext} (expected mkv or mp4)"))
}

/// Extracts links from the file and builds candidates for the extension.
pub(super) fn gather_candidates(file: &Path, ext: MediaExt) -> Result<Vec<Candidate>> {
    let urls = linklist::extract_urls(file)?;
    Ok(urls
        .iter()
        .filter_map(|u| Candidate::from_url(u, ext))
        .collect())
}

/// Replaces URL-derived filenames with header-derived ones where the URL
/// ends in a bare format tag. Network failures leave the fallback name.
pub(super) fn enrich_candidates(candidates: &mut [Candidate], ext: MediaExt) {
    for candidate in candidates.iter_mut() {
        if !url_model::url_ends_in_bare_tag(&candidate.source, ext) {
            continue;
        }
        if let Some(name) = probe::disposition_filename_for(&candidate.source, ext) {
            tracing::debug!(
                source = %candidate.source,
                filename = %name,
                "filename taken from response headers"
            );
            candidate.filename = name;
        }
    }
}
