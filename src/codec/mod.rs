//! Encoding and decoding rule lists.
//!
//! Text and YAML are handled in memory. Compiled (`.mrs`) lists go through
//! a [`RulesetConverter`] with text as the intermediate form.

pub mod text;
pub mod yaml;

use crate::converter::{self, RulesetConverter};
use crate::{Behavior, Encoding, Result};

/// Format of the `# Updated:` header timestamp.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Comment lines written at the top of final text and YAML outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Generation time, already formatted
    pub updated: String,
    /// Number of rules in the body
    pub count: usize,
}

impl Header {
    /// Create a header with a preformatted timestamp.
    pub fn new(updated: impl Into<String>, count: usize) -> Self {
        Self {
            updated: updated.into(),
            count,
        }
    }

    /// Create a header stamped with the current local time.
    pub fn now(count: usize) -> Self {
        Self::new(chrono::Local::now().format(TIMESTAMP_FORMAT).to_string(), count)
    }

    pub(crate) fn write_to(&self, out: &mut String) {
        out.push_str("# Updated: ");
        out.push_str(&self.updated);
        out.push('\n');
        out.push_str("# Rules: ");
        out.push_str(&self.count.to_string());
        out.push('\n');
    }
}

/// Decode raw bytes into uncleaned rule lines.
pub fn decode(
    bytes: &[u8],
    encoding: Encoding,
    behavior: Behavior,
    converter: &dyn RulesetConverter,
) -> Result<Vec<String>> {
    match encoding {
        Encoding::Text => Ok(text::decode(bytes)),
        Encoding::Structured => yaml::decode(bytes),
        Encoding::Compiled => converter::decode_compiled(converter, bytes, behavior),
    }
}

/// Encode a final rule list. Text and YAML outputs get a fresh header.
pub fn encode(
    rules: &[String],
    encoding: Encoding,
    behavior: Behavior,
    converter: &dyn RulesetConverter,
) -> Result<Vec<u8>> {
    match encoding {
        Encoding::Text => Ok(text::encode(rules, Some(&Header::now(rules.len())))),
        Encoding::Structured => yaml::encode(rules, Some(&Header::now(rules.len()))),
        Encoding::Compiled => converter::encode_compiled(converter, rules, behavior),
    }
}
