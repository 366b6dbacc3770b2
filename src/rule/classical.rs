//! Classical `KIND,VALUE` rules.

use std::fmt;

use super::{cidr, domain};

/// Kind tag carried by a classical rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassicalKind {
    /// Exact domain match
    Domain,
    /// Domain and all subdomains
    DomainSuffix,
    /// IPv4 CIDR
    IpCidr,
    /// IPv6 CIDR
    IpCidr6,
}

impl ClassicalKind {
    /// Parse a kind tag. Tags are matched exactly, as Clash does.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "DOMAIN" => Some(ClassicalKind::Domain),
            "DOMAIN-SUFFIX" => Some(ClassicalKind::DomainSuffix),
            "IP-CIDR" => Some(ClassicalKind::IpCidr),
            "IP-CIDR6" => Some(ClassicalKind::IpCidr6),
            _ => None,
        }
    }

    /// Get the tag as written in rule lists.
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassicalKind::Domain => "DOMAIN",
            ClassicalKind::DomainSuffix => "DOMAIN-SUFFIX",
            ClassicalKind::IpCidr => "IP-CIDR",
            ClassicalKind::IpCidr6 => "IP-CIDR6",
        }
    }

    /// Whether the value must pass the domain grammar.
    pub fn is_domain(&self) -> bool {
        matches!(self, ClassicalKind::Domain | ClassicalKind::DomainSuffix)
    }

    /// Whether the value must pass a CIDR grammar.
    pub fn is_ip(&self) -> bool {
        matches!(self, ClassicalKind::IpCidr | ClassicalKind::IpCidr6)
    }

    fn accepts(&self, value: &str) -> bool {
        match self {
            ClassicalKind::Domain | ClassicalKind::DomainSuffix => domain::is_valid_domain(value),
            ClassicalKind::IpCidr => cidr::is_ipv4_cidr(value),
            ClassicalKind::IpCidr6 => cidr::is_ipv6_cidr(value),
        }
    }
}

impl fmt::Display for ClassicalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Split a classical rule into its kind tag and trimmed value.
///
/// The value is the second comma-separated field; trailing options such as
/// `no-resolve` are ignored here but stay part of the rule.
pub fn split(rule: &str) -> Option<(ClassicalKind, &str)> {
    let mut parts = rule.split(',');
    let kind = ClassicalKind::parse(parts.next()?)?;
    let value = parts.next()?.trim();
    Some((kind, value))
}

/// Validate a classical rule. The accepted rule is returned unchanged.
pub fn validate(rule: &str) -> Option<String> {
    let (kind, value) = split(rule)?;
    if kind.accepts(value) {
        Some(rule.to_string())
    } else {
        None
    }
}
