//! Merge configuration.
//!
//! The configuration file is a YAML list of targets:
//!
//! ```yaml
//! - path: rules/proxy.yaml
//!   behavior: domain
//!   format: yaml
//!   upstream:
//!     gfw:
//!       type: http
//!       url: https://example.com/gfw.yaml
//!       behavior: classical
//!     local:
//!       type: file
//!       path: extra.txt
//!       behavior: domain
//!       format: text
//! ```

use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::{Behavior, Encoding, Error, Result};

/// Where a source's bytes come from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Origin {
    /// Remote rule provider
    Http { url: String },
    /// Local file
    File { path: PathBuf },
}

impl Origin {
    /// URL or path as a string, for logging and suffix sniffing.
    pub fn location(&self) -> String {
        match self {
            Origin::Http { url } => url.clone(),
            Origin::File { path } => path.to_string_lossy().into_owned(),
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Http { url } => write!(f, "http {}", url),
            Origin::File { path } => write!(f, "file {}", path.display()),
        }
    }
}

/// One upstream rule list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RuleSource {
    #[serde(flatten)]
    pub origin: Origin,
    /// Behavior the upstream list is written in
    #[serde(default)]
    pub behavior: Behavior,
    /// Declared encoding; `None` means guess from suffix / content type
    #[serde(rename = "format", default)]
    pub encoding: Option<Encoding>,
}

impl RuleSource {
    /// Create a remote source.
    pub fn http(url: impl Into<String>, behavior: Behavior, encoding: Option<Encoding>) -> Self {
        Self {
            origin: Origin::Http { url: url.into() },
            behavior,
            encoding,
        }
    }

    /// Create a local file source.
    pub fn file(path: impl Into<PathBuf>, behavior: Behavior, encoding: Option<Encoding>) -> Self {
        Self {
            origin: Origin::File { path: path.into() },
            behavior,
            encoding,
        }
    }
}

/// One merged output file and the upstreams feeding it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TargetDefinition {
    /// Output path
    pub path: PathBuf,
    /// Behavior of the merged list
    #[serde(default)]
    pub behavior: Behavior,
    /// Output encoding
    #[serde(rename = "format", default)]
    pub encoding: Encoding,
    /// Named upstream sources
    pub upstream: BTreeMap<String, RuleSource>,
}

impl TargetDefinition {
    /// Create a target with no sources.
    pub fn new(path: impl Into<PathBuf>, behavior: Behavior, encoding: Encoding) -> Self {
        Self {
            path: path.into(),
            behavior,
            encoding,
            upstream: BTreeMap::new(),
        }
    }

    /// Add a named source.
    pub fn with_source(mut self, name: impl Into<String>, source: RuleSource) -> Self {
        self.upstream.insert(name.into(), source);
        self
    }

    /// Check the behavior/encoding pair can be produced.
    ///
    /// The converter cannot compile classical lists, so classical + mrs is
    /// refused.
    pub fn check_output(&self) -> Result<()> {
        match (self.behavior, self.encoding) {
            (Behavior::Classical, Encoding::Compiled) => Err(Error::UnsupportedCombination {
                behavior: self.behavior,
                encoding: self.encoding,
            }),
            _ => Ok(()),
        }
    }
}

/// The full list of targets.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Config {
    pub targets: Vec<TargetDefinition>,
}

impl Config {
    /// Load and validate a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::parse(&content).map_err(|e| match e {
            Error::Config(msg) => Error::Config(format!("{}: {}", path.display(), msg)),
            other => other,
        })
    }

    /// Parse and validate configuration YAML.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config =
            serde_yaml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values serde cannot: non-empty locations, URL schemes,
    /// unique output paths.
    pub fn validate(&self) -> Result<()> {
        let mut outputs = HashSet::new();

        for (index, target) in self.targets.iter().enumerate() {
            if target.path.as_os_str().is_empty() {
                return Err(Error::Config(format!("target #{} has an empty path", index + 1)));
            }
            if !outputs.insert(&target.path) {
                return Err(Error::Config(format!(
                    "output path {} is used by more than one target",
                    target.path.display()
                )));
            }

            for (name, source) in &target.upstream {
                match &source.origin {
                    Origin::Http { url } => {
                        if !(url.starts_with("http://") || url.starts_with("https://")) {
                            return Err(Error::Config(format!(
                                "source {:?} of {} has an invalid url {:?}",
                                name,
                                target.path.display(),
                                url
                            )));
                        }
                    }
                    Origin::File { path } => {
                        if path.as_os_str().is_empty() {
                            return Err(Error::Config(format!(
                                "source {:?} of {} has an empty path",
                                name,
                                target.path.display()
                            )));
                        }
                    }
                }
            }
        }

        Ok(())
    }
}
