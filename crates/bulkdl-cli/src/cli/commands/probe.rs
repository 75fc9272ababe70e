//! Response-header probe for bare-tag URLs.
//!
//! A HEAD request with redirects followed often yields the real filename in
//! Content-Disposition. Best-effort only: any failure leaves the URL-derived
//! filename in place.

use std::process::Command;

use bulkdl_core::job::MediaExt;
use bulkdl_core::url_model;

pub(super) fn disposition_filename_for(source: &str, ext: MediaExt) -> Option<String> {
    let output = Command::new("curl")
        .args(["-sIL", "--max-redirs", "10"])
        .arg(source)
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let headers = String::from_utf8_lossy(&output.stdout);
    url_model::filename_from_headers(&headers, ext)
}
