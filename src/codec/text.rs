//! Line-delimited text rule lists.

use super::Header;

/// Split text into lines. Invalid UTF-8 is replaced rather than rejected.
pub fn decode(bytes: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(bytes)
        .lines()
        .map(str::to_string)
        .collect()
}

/// Render rules one per line, each newline-terminated, optionally preceded
/// by the header comment lines.
pub fn encode(rules: &[String], header: Option<&Header>) -> Vec<u8> {
    let mut out = String::with_capacity(rules.iter().map(|r| r.len() + 1).sum::<usize>() + 64);
    if let Some(header) = header {
        header.write_to(&mut out);
    }
    for rule in rules {
        out.push_str(rule);
        out.push('\n');
    }
    out.into_bytes()
}
