//! Loading raw rule lines from upstream sources.
//!
//! A source that cannot be fetched, read or decoded contributes nothing.
//! The failure is logged and the merge carries on with the other sources.

use std::fs;
use std::time::Duration;

use crate::codec;
use crate::config::{Origin, RuleSource};
use crate::converter::RulesetConverter;
use crate::{Encoding, Error, Result};

/// Body and content type of a fetched document.
#[derive(Debug, Clone, Default)]
pub struct Fetched {
    pub body: Vec<u8>,
    pub content_type: Option<String>,
}

/// Fetches remote rule providers.
pub trait Fetcher: Send + Sync {
    /// GET `url`. Transport errors and non-success statuses are errors.
    fn fetch(&self, url: &str) -> Result<Fetched>;
}

/// Blocking HTTP fetcher.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Create a fetcher whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("k2rule-merge/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Fetched> {
        let response = self.client.get(url).send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes()?.to_vec();

        Ok(Fetched { body, content_type })
    }
}

/// Pick the encoding to decode a source with.
///
/// A declared encoding always wins. Without one, the URL/path suffix is
/// tried, then a YAML content type, then the Structured default.
pub fn resolve_encoding(
    declared: Option<Encoding>,
    location: &str,
    content_type: Option<&str>,
) -> Encoding {
    if let Some(encoding) = declared {
        return encoding;
    }
    if let Some(encoding) = Encoding::from_extension(location) {
        return encoding;
    }
    if content_type.is_some_and(|ct| ct.to_lowercase().contains("yaml")) {
        return Encoding::Structured;
    }
    Encoding::default()
}

/// Loads sources into raw (uncleaned, untransformed) rule lines.
pub struct SourceLoader<'a> {
    fetcher: &'a dyn Fetcher,
    converter: &'a dyn RulesetConverter,
}

impl<'a> SourceLoader<'a> {
    /// Create a loader.
    pub fn new(fetcher: &'a dyn Fetcher, converter: &'a dyn RulesetConverter) -> Self {
        Self { fetcher, converter }
    }

    /// Load a source, logging and swallowing any failure.
    pub fn load(&self, name: &str, source: &RuleSource) -> Vec<String> {
        match self.try_load(source) {
            Ok(lines) => {
                log::debug!("Loaded {} lines from {} ({})", lines.len(), name, source.origin);
                lines
            }
            Err(e) => {
                log::error!("Failed to load source {} ({}): {}", name, source.origin, e);
                Vec::new()
            }
        }
    }

    /// Load a source, returning the first failure.
    pub fn try_load(&self, source: &RuleSource) -> Result<Vec<String>> {
        let (body, content_type) = match &source.origin {
            Origin::Http { url } => {
                let fetched = self.fetcher.fetch(url)?;
                (fetched.body, fetched.content_type)
            }
            Origin::File { path } => (fs::read(path)?, None),
        };

        let encoding = resolve_encoding(
            source.encoding,
            &source.origin.location(),
            content_type.as_deref(),
        );

        codec::decode(&body, encoding, source.behavior, self.converter)
    }
}
