//! Physical rule list encodings.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Error;

/// Encoding is the on-disk / on-wire representation of a rule list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Encoding {
    /// One rule per line
    #[serde(rename = "text", alias = "txt")]
    Text,
    /// YAML mapping with a `payload` sequence
    #[default]
    #[serde(rename = "yaml", alias = "yml", alias = "structured")]
    Structured,
    /// Opaque binary (`.mrs`), only handled by the external converter
    #[serde(rename = "mrs", alias = "compiled")]
    Compiled,
}

impl Encoding {
    /// Parse an encoding from a string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "text" | "txt" => Some(Encoding::Text),
            "yaml" | "yml" | "structured" => Some(Encoding::Structured),
            "mrs" | "compiled" => Some(Encoding::Compiled),
            _ => None,
        }
    }

    /// Guess the encoding from a URL or path suffix.
    pub fn from_extension(location: &str) -> Option<Self> {
        // Ignore any query string or fragment on URLs.
        let location = location
            .split(['?', '#'])
            .next()
            .unwrap_or(location)
            .to_lowercase();

        if location.ends_with(".yml") || location.ends_with(".yaml") {
            Some(Encoding::Structured)
        } else if location.ends_with(".mrs") {
            Some(Encoding::Compiled)
        } else if location.ends_with(".txt") || location.ends_with(".list") {
            Some(Encoding::Text)
        } else {
            None
        }
    }

    /// Get the string representation used in configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Encoding::Text => "text",
            Encoding::Structured => "yaml",
            Encoding::Compiled => "mrs",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Encoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Encoding::parse(s).ok_or_else(|| Error::InvalidEncoding(s.to_string()))
    }
}
