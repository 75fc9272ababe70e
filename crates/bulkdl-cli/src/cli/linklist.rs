//! Link extraction from CSV/text files.
//!
//! Not a scraper: any file whose text contains http(s) URLs works, one or
//! many per line, comma-separated or not.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use regex::Regex;

/// Extracts http(s) URLs from a file, de-duplicated in input order.
pub fn extract_urls(path: &Path) -> Result<Vec<String>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("read link file {}", path.display()))?;
    Ok(extract_urls_from_text(&text))
}

pub fn extract_urls_from_text(text: &str) -> Vec<String> {
    let url_re = Regex::new(r#"(?i)https?://[^\s",]+"#).expect("valid URL regex");
    let mut seen = HashSet::new();
    let mut urls = Vec::new();
    for m in url_re.find_iter(text) {
        let url = m.as_str().to_string();
        if seen.insert(url.clone()) {
            urls.push(url);
        }
    }
    urls
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_urls_in_csv_lines() {
        let text = "ep01,https://example.com/a.mkv,1080p\nep02,https://example.com/b.mkv,720p\n";
        let urls = extract_urls_from_text(text);
        assert_eq!(
            urls,
            vec![
                "https://example.com/a.mkv".to_string(),
                "https://example.com/b.mkv".to_string(),
            ]
        );
    }

    #[test]
    fn dedups_preserving_first_occurrence_order() {
        let text = "https://example.com/b.mkv https://example.com/a.mkv https://example.com/b.mkv";
        let urls = extract_urls_from_text(text);
        assert_eq!(
            urls,
            vec![
                "https://example.com/b.mkv".to_string(),
                "https://example.com/a.mkv".to_string(),
            ]
        );
    }

    #[test]
    fn ignores_non_http_schemes() {
        let text = "ftp://example.com/a.mkv file:///tmp/b.mkv https://example.com/c.mkv";
        let urls = extract_urls_from_text(text);
        assert_eq!(urls, vec!["https://example.com/c.mkv".to_string()]);
    }

    #[test]
    fn reads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("links.csv");
        std::fs::write(&path, "x,HTTP://example.com/a.mkv\n").unwrap();
        let urls = extract_urls(&path).unwrap();
        assert_eq!(urls, vec!["HTTP://example.com/a.mkv".to_string()]);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(extract_urls(Path::new("/no/such/file.csv")).is_err());
    }
}
