//! Linux-safe filename sanitization.

/// Maximum filename length in bytes (Linux NAME_MAX).
const NAME_MAX: usize = 255;

/// Sanitizes a candidate filename for safe use on Linux:
///
/// - NUL, `/`, `\`, control characters, and whitespace become `_`
/// - runs of `_` collapse to one
/// - leading/trailing dots, spaces, and underscores are trimmed
/// - the result is truncated to 255 bytes on a char boundary
pub fn sanitize_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        let unsafe_char =
            c == '\0' || c == '/' || c == '\\' || c.is_control() || c == ' ' || c == '\t';
        if unsafe_char {
            if !out.ends_with('_') {
                out.push('_');
            }
        } else {
            out.push(c);
        }
    }

    let trimmed = out.trim_matches(|c| c == '.' || c == '_');
    truncate_at_boundary(trimmed, NAME_MAX).to_string()
}

fn truncate_at_boundary(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
