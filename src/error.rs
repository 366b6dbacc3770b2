//! Error types for k2rule-merge.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::{Behavior, Encoding};

/// Error type for k2rule-merge operations.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Transport-level download error
    #[error("download error: {0}")]
    Download(#[from] reqwest::Error),

    /// Upstream answered with a non-success status
    #[error("HTTP {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    /// Structured document without a usable rule list
    #[error("invalid rule payload: {0}")]
    InvalidPayload(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Unknown behavior tag
    #[error("invalid behavior: {0}")]
    InvalidBehavior(String),

    /// Unknown encoding tag
    #[error("invalid format: {0}")]
    InvalidEncoding(String),

    /// Converter executable could not be started
    #[error("ruleset converter not found: {0}")]
    ConverterNotFound(PathBuf),

    /// Converter exited unsuccessfully
    #[error("ruleset converter failed ({status}): {stderr}")]
    ConverterFailed { status: String, stderr: String },

    /// Converter did not finish in time
    #[error("ruleset converter timed out after {0:?}")]
    ConverterTimeout(Duration),

    /// Behavior and encoding cannot be combined in one output
    #[error("{behavior} rules cannot be written as {encoding}")]
    UnsupportedCombination { behavior: Behavior, encoding: Encoding },
}

/// Result type alias for k2rule-merge operations.
pub type Result<T> = std::result::Result<T, Error>;
