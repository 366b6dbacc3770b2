//! Rule behavior definitions.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Error;

/// Behavior is the semantic kind of a rule list.
///
/// It decides which rule syntaxes are accepted and how rules are rewritten
/// when moved into a list of another behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Behavior {
    /// `KIND,VALUE` rules with an explicit DOMAIN/DOMAIN-SUFFIX/IP-CIDR/IP-CIDR6 tag
    #[default]
    Classical,
    /// Bare IPv4 or IPv6 CIDR values
    #[serde(rename = "ipcidr", alias = "ip-cidr")]
    IpCidr,
    /// Bare domains, `+.` prefix marks a suffix match
    Domain,
}

impl Behavior {
    /// All behaviors, in declaration order.
    pub const ALL: [Behavior; 3] = [Behavior::Classical, Behavior::IpCidr, Behavior::Domain];

    /// Parse a behavior from a string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "classical" => Some(Behavior::Classical),
            "ipcidr" | "ip-cidr" => Some(Behavior::IpCidr),
            "domain" => Some(Behavior::Domain),
            _ => None,
        }
    }

    /// Get the canonical string representation, as the converter expects it.
    pub fn as_str(&self) -> &'static str {
        match self {
            Behavior::Classical => "classical",
            Behavior::IpCidr => "ipcidr",
            Behavior::Domain => "domain",
        }
    }
}

impl fmt::Display for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Behavior {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Behavior::parse(s).ok_or_else(|| Error::InvalidBehavior(s.to_string()))
    }
}
