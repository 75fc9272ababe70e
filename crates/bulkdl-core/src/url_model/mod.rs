//! Filename inference for download sources.
//!
//! The site serves links either ending in the real filename
//! (`.../Show_Ep01.mkv`) or in a bare format segment (`.../download/123/mkv`).
//! Inference prefers the last path segment, falls back to the segment before a
//! bare format tag, and always normalizes the result to the requested
//! extension, sanitized for Linux filesystems.

mod content_disposition;
mod path;
mod sanitize;

pub use content_disposition::disposition_filename;
pub use path::{filename_from_url_path, penultimate_segment};
pub use sanitize::sanitize_filename;

use crate::job::MediaExt;

/// Fallback stem when nothing usable can be derived from the URL.
const DEFAULT_STEM: &str = "download";

/// Whether a URL points at the requested extension: either the path ends in
/// `.{ext}` or in a bare `/{ext}` segment (query/fragment ignored).
pub fn url_matches_extension(url: &str, ext: MediaExt) -> bool {
    let trimmed = strip_query_fragment(url).to_ascii_lowercase();
    trimmed.ends_with(&format!(".{}", ext.as_str()))
        || trimmed.ends_with(&format!("/{}", ext.as_str()))
}

/// Derives the final filename for a source URL, normalized so it ends in
/// `.{ext}` exactly once.
pub fn infer_target_filename(url: &str, ext: MediaExt) -> String {
    let candidate = filename_from_url_path(url)
        .filter(|segment| !is_bare_format_tag(segment))
        .or_else(|| {
            penultimate_segment(url).map(|stem| format!("{stem}.{}", ext.as_str()))
        })
        .unwrap_or_else(|| format!("{DEFAULT_STEM}.{}", ext.as_str()));

    let sanitized = sanitize_filename(&candidate);
    if sanitized.is_empty() {
        return format!("{DEFAULT_STEM}.{}", ext.as_str());
    }
    normalize_extension(&sanitized, ext)
}

/// Filename carried by response headers, normalized like a URL-derived one.
/// `None` when the headers have no usable Content-Disposition filename.
pub fn filename_from_headers(headers: &str, ext: MediaExt) -> Option<String> {
    let raw = disposition_filename(headers)?;
    // Header values are untrusted; keep only the basename.
    let base = raw.rsplit(['/', '\\']).next().unwrap_or(raw.as_str());
    let sanitized = sanitize_filename(base);
    if sanitized.is_empty() {
        return None;
    }
    Some(normalize_extension(&sanitized, ext))
}

/// True when the URL's last path segment is a bare format tag rather than a
/// filename (`.../download/123/mkv`).
pub fn url_ends_in_bare_tag(url: &str, ext: MediaExt) -> bool {
    strip_query_fragment(url)
        .to_ascii_lowercase()
        .ends_with(&format!("/{}", ext.as_str()))
}

/// Last path segments like `mkv` or `mp4` are format tags, not filenames.
fn is_bare_format_tag(segment: &str) -> bool {
    MediaExt::parse(segment).is_some()
}

fn strip_query_fragment(url: &str) -> &str {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    &url[..end]
}

/// Ensures `name` ends in `.{ext}`: a different known media extension is
/// replaced, anything else gets the extension appended.
fn normalize_extension(name: &str, ext: MediaExt) -> String {
    let lower = name.to_ascii_lowercase();
    for known in MediaExt::ALL {
        let suffix = format!(".{}", known.as_str());
        if lower.ends_with(&suffix) {
            if known == ext {
                return name.to_string();
            }
            let stem = &name[..name.len() - suffix.len()];
            return format!("{stem}.{}", ext.as_str());
        }
    }
    format!("{name}.{}", ext.as_str())
}
