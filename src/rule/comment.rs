//! Comment stripping for raw rule lines.

use once_cell::sync::Lazy;
use regex::Regex;

/// Whitespace followed by `#` starts an inline comment.
static INLINE_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+#").unwrap());

/// Clean a raw line: trim it, drop comment-only lines, strip the first
/// inline comment. Returns an empty string when nothing is left.
pub fn clean(line: &str) -> &str {
    let line = line.trim();
    if line.starts_with('#') {
        return "";
    }

    match INLINE_COMMENT.find(line) {
        Some(m) => line[..m.start()].trim(),
        None => line,
    }
}
