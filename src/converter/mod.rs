//! Bridge to the external compiled-ruleset converter.
//!
//! The `.mrs` format is never parsed here. Both directions go through a
//! [`RulesetConverter`], with plain text as the intermediate form. Scratch
//! files live in a temporary directory that is removed when the call
//! returns, whether the converter succeeded or not.

mod process;

pub use process::ProcessConverter;

use std::fmt;
use std::fs;
use std::path::Path;

use crate::codec::text;
use crate::{Behavior, Encoding, Error, Result};

/// Input format tag passed to the converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvertTag {
    /// Input is a text list, output is compiled
    Text,
    /// Input is compiled, output is a text list
    Mrs,
}

impl ConvertTag {
    /// Get the tag as passed on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConvertTag::Text => "text",
            ConvertTag::Mrs => "mrs",
        }
    }
}

impl fmt::Display for ConvertTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A converter between text rule lists and the compiled format.
///
/// [`ProcessConverter`] runs the real binary; tests plug in fakes.
pub trait RulesetConverter: Send + Sync {
    /// Convert `input` into `output`. `tag` names the format of `input`.
    fn convert(&self, behavior: Behavior, tag: ConvertTag, input: &Path, output: &Path)
        -> Result<()>;
}

fn scratch_dir() -> Result<tempfile::TempDir> {
    Ok(tempfile::Builder::new().prefix("k2rule-merge-").tempdir()?)
}

/// Decode compiled bytes into raw text lines.
pub fn decode_compiled(
    converter: &dyn RulesetConverter,
    bytes: &[u8],
    behavior: Behavior,
) -> Result<Vec<String>> {
    let scratch = scratch_dir()?;
    let input = scratch.path().join("input.mrs");
    let output = scratch.path().join("output.txt");

    fs::write(&input, bytes)?;
    converter.convert(behavior, ConvertTag::Mrs, &input, &output)?;
    let decoded = fs::read(&output)?;

    Ok(text::decode(&decoded))
}

/// Encode rules into compiled bytes.
///
/// Classical rule sets cannot be compiled and are rejected before the
/// converter is invoked.
pub fn encode_compiled(
    converter: &dyn RulesetConverter,
    rules: &[String],
    behavior: Behavior,
) -> Result<Vec<u8>> {
    if behavior == Behavior::Classical {
        return Err(Error::UnsupportedCombination {
            behavior,
            encoding: Encoding::Compiled,
        });
    }

    let scratch = scratch_dir()?;
    let input = scratch.path().join("input.txt");
    let output = scratch.path().join("output.mrs");

    // No header lines in the intermediate text.
    fs::write(&input, text::encode(rules, None))?;
    converter.convert(behavior, ConvertTag::Text, &input, &output)?;

    Ok(fs::read(&output)?)
}
