//! Clash rule provider YAML (`payload:` lists).

use serde::Serialize;
use serde_yaml::Value;

use super::Header;
use crate::{Error, Result};

/// Rule provider payload structure.
#[derive(Debug, Serialize)]
struct ProviderPayload<'a> {
    payload: &'a [String],
}

/// Extract rule strings from a provider document.
///
/// Accepts a mapping with a `payload` sequence or a bare sequence. A null
/// document or null `payload` is an empty list. Non-string entries are
/// skipped.
pub fn decode(bytes: &[u8]) -> Result<Vec<String>> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    let document: Value = serde_yaml::from_slice(bytes)?;

    let items = match document {
        Value::Null => return Ok(Vec::new()),
        Value::Sequence(items) => items,
        Value::Mapping(mut map) => match map.remove("payload") {
            Some(Value::Sequence(items)) => items,
            Some(Value::Null) => Vec::new(),
            None if map.is_empty() => Vec::new(),
            Some(_) => return Err(Error::InvalidPayload("payload is not a sequence".into())),
            None => return Err(Error::InvalidPayload("mapping has no payload key".into())),
        },
        _ => return Err(Error::InvalidPayload("expected a mapping or a sequence".into())),
    };

    let mut rules = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Value::String(rule) => rules.push(rule),
            Value::Null => {}
            other => log::debug!("Skipping non-string payload entry: {:?}", other),
        }
    }
    Ok(rules)
}

/// Render rules as `payload:` in block style, items indented two spaces.
pub fn encode(rules: &[String], header: Option<&Header>) -> Result<Vec<u8>> {
    let body = serde_yaml::to_string(&ProviderPayload { payload: rules })?;

    let mut out = String::with_capacity(body.len() + rules.len() * 2 + 64);
    if let Some(header) = header {
        header.write_to(&mut out);
    }
    out.push_str(&body.replace("\n-", "\n  -"));
    Ok(out.into_bytes())
}
