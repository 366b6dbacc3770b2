//! Rule validation, cleaning and behavior transforms.
//!
//! Rules are plain strings. A rule accepted for a behavior is returned
//! exactly as given, so validating it again is a no-op. Rejected rules are
//! `None`; callers drop them and move on.

pub mod cidr;
pub mod classical;
mod comment;
mod convert;
pub mod domain;

pub use classical::ClassicalKind;
pub use comment::clean;
pub use convert::{transform, Transform};

use crate::Behavior;

/// Validate a cleaned rule against the syntax of `behavior`.
///
/// # Examples
/// ```
/// use k2rule_merge::{rule, Behavior};
///
/// assert!(rule::validate("DOMAIN-SUFFIX,example.com", Behavior::Classical).is_some());
/// assert!(rule::validate("+.example.com", Behavior::Domain).is_some());
/// assert!(rule::validate("10.0.0.0/8", Behavior::IpCidr).is_some());
/// assert!(rule::validate("DOMAIN,not a domain!!", Behavior::Classical).is_none());
/// ```
pub fn validate(rule: &str, behavior: Behavior) -> Option<String> {
    match behavior {
        Behavior::Classical => classical::validate(rule),
        Behavior::IpCidr => cidr::validate(rule),
        Behavior::Domain => domain::validate(rule),
    }
}
