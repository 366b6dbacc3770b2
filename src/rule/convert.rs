//! Rewriting rules between behaviors.

use super::classical::{self, ClassicalKind};
use super::domain::{self, SUFFIX_PREFIX};
use super::validate;
use crate::Behavior;

/// How a rule moves from one behavior to another.
///
/// Every `(from, to)` pair maps to exactly one variant; pairs with no
/// rewrite path map to [`Transform::Unsupported`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// Same behavior on both sides: validate only
    Validate(Behavior),
    /// `IP-CIDR,v` / `IP-CIDR6,v` → `v`
    ClassicalToIpCidr,
    /// `DOMAIN,d` → `d`, `DOMAIN-SUFFIX,d` → `+.d`
    ClassicalToDomain,
    /// `v` → `IP-CIDR,v` or `IP-CIDR6,v`
    IpCidrToClassical,
    /// `d` → `DOMAIN,d`, `+.d` → `DOMAIN-SUFFIX,d`
    DomainToClassical,
    /// No direct path (ipcidr ↔ domain)
    Unsupported,
}

impl Transform {
    /// Look up the transform for a behavior pair.
    pub fn lookup(from: Behavior, to: Behavior) -> Self {
        match (from, to) {
            (Behavior::Classical, Behavior::Classical) => Transform::Validate(Behavior::Classical),
            (Behavior::IpCidr, Behavior::IpCidr) => Transform::Validate(Behavior::IpCidr),
            (Behavior::Domain, Behavior::Domain) => Transform::Validate(Behavior::Domain),
            (Behavior::Classical, Behavior::IpCidr) => Transform::ClassicalToIpCidr,
            (Behavior::Classical, Behavior::Domain) => Transform::ClassicalToDomain,
            (Behavior::IpCidr, Behavior::Classical) => Transform::IpCidrToClassical,
            (Behavior::Domain, Behavior::Classical) => Transform::DomainToClassical,
            (Behavior::IpCidr, Behavior::Domain) | (Behavior::Domain, Behavior::IpCidr) => {
                Transform::Unsupported
            }
        }
    }

    /// Whether this transform can ever produce a rule.
    pub fn is_supported(&self) -> bool {
        !matches!(self, Transform::Unsupported)
    }

    /// Apply the transform to a cleaned rule.
    pub fn apply(&self, rule: &str) -> Option<String> {
        if rule.is_empty() {
            return None;
        }

        match self {
            Transform::Validate(behavior) => validate(rule, *behavior),
            Transform::ClassicalToIpCidr => classical_to_ipcidr(rule),
            Transform::ClassicalToDomain => classical_to_domain(rule),
            Transform::IpCidrToClassical => Some(ipcidr_to_classical(rule)),
            Transform::DomainToClassical => domain_to_classical(rule),
            Transform::Unsupported => None,
        }
    }
}

/// Transform a single rule from one behavior to another.
pub fn transform(rule: &str, from: Behavior, to: Behavior) -> Option<String> {
    Transform::lookup(from, to).apply(rule)
}

fn classical_to_ipcidr(rule: &str) -> Option<String> {
    let (kind, value) = classical::split(rule)?;
    if !kind.is_ip() || value.is_empty() {
        return None;
    }
    Some(value.to_string())
}

fn classical_to_domain(rule: &str) -> Option<String> {
    let (kind, value) = classical::split(rule)?;
    if !domain::is_valid_domain(value) {
        return None;
    }
    match kind {
        ClassicalKind::Domain => Some(value.to_string()),
        ClassicalKind::DomainSuffix => Some(format!("{SUFFIX_PREFIX}{value}")),
        ClassicalKind::IpCidr | ClassicalKind::IpCidr6 => None,
    }
}

fn ipcidr_to_classical(rule: &str) -> String {
    let kind = if rule.contains(':') {
        ClassicalKind::IpCidr6
    } else {
        ClassicalKind::IpCidr
    };
    format!("{kind},{rule}")
}

fn domain_to_classical(rule: &str) -> Option<String> {
    let (is_suffix, value) = domain::split_suffix(rule);
    if !domain::is_valid_domain(value) {
        return None;
    }
    let kind = if is_suffix {
        ClassicalKind::DomainSuffix
    } else {
        ClassicalKind::Domain
    };
    Some(format!("{kind},{value}"))
}
