//! Domain-label grammar and domain-behavior validation.

use once_cell::sync::Lazy;
use regex::Regex;

/// Prefix marking a suffix match in domain-behavior lists.
pub const SUFFIX_PREFIX: &str = "+.";

/// Dot-separated labels of `[A-Za-z0-9]` with optional interior hyphens.
static DOMAIN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9]([a-zA-Z0-9-]*[a-zA-Z0-9])?(\.[a-zA-Z0-9]([a-zA-Z0-9-]*[a-zA-Z0-9])?)*$")
        .unwrap()
});

/// Check a bare domain against the label grammar.
///
/// No case folding is done: `Example.COM` is valid and stays as written.
pub fn is_valid_domain(domain: &str) -> bool {
    DOMAIN_PATTERN.is_match(domain)
}

/// Split a domain-behavior rule into `(is_suffix, domain)`.
pub fn split_suffix(rule: &str) -> (bool, &str) {
    match rule.strip_prefix(SUFFIX_PREFIX) {
        Some(domain) => (true, domain),
        None => (false, rule),
    }
}

/// Validate a domain-behavior rule (`example.com` or `+.example.com`).
pub fn validate(rule: &str) -> Option<String> {
    let (_, domain) = split_suffix(rule);
    if is_valid_domain(domain) {
        Some(rule.to_string())
    } else {
        None
    }
}
