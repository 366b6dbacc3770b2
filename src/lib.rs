//! K2Rule Merge - merge Clash rule providers into deduplicated rule sets.
//!
//! This crate pulls rule lists from many upstreams (HTTP or local files),
//! rewrites every rule into one target behavior, and writes a single sorted,
//! deduplicated list per configured target.
//!
//! # Features
//!
//! - **Three behaviors**: `classical` (`DOMAIN,a.com`), `domain` (`+.a.com`)
//!   and `ipcidr` (`1.2.3.0/24`), with conversion between classical and the
//!   other two
//! - **Three formats**: plain text, YAML `payload:` lists, and compiled
//!   `.mrs` via an external converter (mihomo)
//! - **Validation**: malformed rules are dropped one by one, never failing a
//!   source
//! - **Fault isolation**: a dead upstream or failed write only affects its own
//!   source or target
//!
//! # Quick Start
//!
//! ```ignore
//! use k2rule_merge::{Config, HttpFetcher, Merger, ProcessConverter};
//!
//! let config = Config::load("config.yaml")?;
//! let merger = Merger::new(
//!     HttpFetcher::new(HttpFetcher::DEFAULT_TIMEOUT)?,
//!     ProcessConverter::locate("mihomo"),
//! );
//!
//! let report = merger.run(&config);
//! println!("{} targets written", report.written());
//! ```
//!
//! # Rule Conversion
//!
//! | from → to            | rule                         | result                      |
//! |----------------------|------------------------------|-----------------------------|
//! | classical → domain   | `DOMAIN-SUFFIX,example.com`  | `+.example.com`             |
//! | classical → ipcidr   | `IP-CIDR6,2001:db8::/32`     | `2001:db8::/32`             |
//! | domain → classical   | `example.com`                | `DOMAIN,example.com`        |
//! | ipcidr → classical   | `1.2.3.0/24`                 | `IP-CIDR,1.2.3.0/24`        |
//!
//! `domain` and `ipcidr` cannot be converted into each other; such sources
//! contribute nothing to the target.

mod behavior;
mod encoding;
mod error;

pub mod codec;
pub mod config;
pub mod converter;
pub mod merge;
pub mod rule;
pub mod source;

// Re-export core types
pub use behavior::Behavior;
pub use encoding::Encoding;
pub use error::{Error, Result};

// Re-export configuration
pub use config::{Config, Origin, RuleSource, TargetDefinition};

// Re-export pipeline
pub use merge::{MergedRuleSet, Merger, RunReport, SourceReport, TargetReport, TargetStatus};

// Re-export collaborators
pub use converter::{ConvertTag, ProcessConverter, RulesetConverter};
pub use source::{Fetched, Fetcher, HttpFetcher, SourceLoader};

// Re-export rule operations
pub use rule::{clean, transform, validate, Transform};
