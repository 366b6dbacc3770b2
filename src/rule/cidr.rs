//! IP-CIDR grammars and ipcidr-behavior validation.
//!
//! The grammars are shape checks only. Octet ranges and prefix lengths are
//! not bounded, so `999.999.999.999/99` passes; upstream lists relying on
//! that leniency keep merging the same way.

use once_cell::sync::Lazy;
use regex::Regex;

/// `ddd.ddd.ddd.ddd/dd`
static IPV4_CIDR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{1,3}\.){3}[0-9]{1,3}/[0-9]{1,2}$").unwrap());

/// Hex digits and colons, then `/ddd`
static IPV6_CIDR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9a-fA-F:]+/[0-9]{1,3}$").unwrap());

/// Check an IPv4 CIDR value.
pub fn is_ipv4_cidr(value: &str) -> bool {
    IPV4_CIDR_PATTERN.is_match(value)
}

/// Check an IPv6 CIDR value.
pub fn is_ipv6_cidr(value: &str) -> bool {
    IPV6_CIDR_PATTERN.is_match(value)
}

/// Validate an ipcidr-behavior rule (bare IPv4 or IPv6 CIDR).
pub fn validate(rule: &str) -> Option<String> {
    if is_ipv4_cidr(rule) || is_ipv6_cidr(rule) {
        Some(rule.to_string())
    } else {
        None
    }
}
