//! Path segment extraction from URLs.

/// Last non-empty path segment of a URL, or `None` if the URL cannot be
/// parsed or the path is empty/root. Query and fragment are not part of the
/// parsed path and never leak into the result.
pub fn filename_from_url_path(url: &str) -> Option<String> {
    let segments = path_segments(url)?;
    let last = segments.last()?;
    if last == "." || last == ".." {
        return None;
    }
    Some(last.clone())
}

/// Segment before the last one, used as a filename stem when the last segment
/// is a bare format tag (`.../episode-name/mkv`).
pub fn penultimate_segment(url: &str) -> Option<String> {
    let segments = path_segments(url)?;
    if segments.len() < 2 {
        return None;
    }
    segments.get(segments.len() - 2).cloned()
}

fn path_segments(url: &str) -> Option<Vec<String>> {
    let parsed = url::Url::parse(url).ok()?;
    let segments: Vec<String> = parsed
        .path()
        .split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if segments.is_empty() {
        None
    } else {
        Some(segments)
    }
}
