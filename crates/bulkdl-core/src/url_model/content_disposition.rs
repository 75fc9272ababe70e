//! Filename extraction from Content-Disposition response headers.
//!
//! Bare-tag URLs (`.../download/123/mkv`) say nothing about the episode
//! name; the server often carries it in a Content-Disposition header. The
//! extractor takes the whole header blob as curl prints it.

/// Finds the Content-Disposition line in a raw header blob and extracts the
/// filename parameter. `None` when no usable filename is present.
pub fn disposition_filename(headers: &str) -> Option<String> {
    headers.lines().find_map(|line| {
        let (name, value) = line.split_once(':')?;
        if !name.trim().eq_ignore_ascii_case("content-disposition") {
            return None;
        }
        filename_param(value)
    })
}

/// Extracts the filename from one header value. `filename*` wins over plain
/// `filename` when both are present (RFC 6266).
fn filename_param(value: &str) -> Option<String> {
    let mut plain: Option<String> = None;
    for param in value.split(';') {
        let Some((key, raw)) = param.split_once('=') else {
            continue;
        };
        let key = key.trim();
        let raw = raw.trim().trim_end_matches('\r');

        if key.eq_ignore_ascii_case("filename*") {
            let encoded = raw
                .strip_prefix("UTF-8''")
                .or_else(|| raw.strip_prefix("utf-8''"));
            if let Some(encoded) = encoded {
                let decoded = percent_decode(encoded);
                if !decoded.is_empty() {
                    return Some(decoded);
                }
            }
        } else if key.eq_ignore_ascii_case("filename") {
            let unquoted = raw.trim_matches(['"', '\'']).trim();
            if !unquoted.is_empty() {
                plain = Some(unquoted.to_string());
            }
        }
    }
    plain
}

/// Percent-decoding for RFC 5987 `filename*` values. Malformed escapes are
/// kept literally.
fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex_val(bytes[i + 1]), hex_val(bytes[i + 2])) {
                out.push(hi << 4 | lo);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_val(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
