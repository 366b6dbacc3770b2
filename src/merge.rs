//! The merge pipeline.
//!
//! For every target: load each upstream, clean and transform every line into
//! the target behavior, then dedupe, sort, encode and write. Targets run in
//! parallel, and so do the sources of a target. A failing source contributes
//! nothing; a failing target does not stop the others.

use serde::Serialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;

use crate::codec;
use crate::config::{Config, RuleSource, TargetDefinition};
use crate::converter::RulesetConverter;
use crate::rule::{self, Transform};
use crate::source::{Fetcher, SourceLoader};
use crate::{Behavior, Encoding, Result};

/// Deduplicated, lexicographically sorted rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergedRuleSet {
    rules: Vec<String>,
}

impl MergedRuleSet {
    /// Get the rules.
    pub fn rules(&self) -> &[String] {
        &self.rules
    }

    /// Get the number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if there are no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Take the rules.
    pub fn into_vec(self) -> Vec<String> {
        self.rules
    }
}

impl FromIterator<String> for MergedRuleSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let unique: BTreeSet<String> = iter.into_iter().collect();
        Self {
            rules: unique.into_iter().collect(),
        }
    }
}

/// Rules accepted from one source, before dedupe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceReport {
    pub name: String,
    pub rules: usize,
}

/// What happened to a target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum TargetStatus {
    /// Output written
    Written {
        rules: usize,
        sources: Vec<SourceReport>,
    },
    /// Target not processed, no file written
    Skipped { reason: String },
    /// Output could not be written
    Failed { error: String },
}

/// Outcome of one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetReport {
    pub path: PathBuf,
    pub behavior: Behavior,
    #[serde(rename = "format")]
    pub encoding: Encoding,
    #[serde(flatten)]
    pub status: TargetStatus,
}

impl TargetReport {
    fn new(target: &TargetDefinition, status: TargetStatus) -> Self {
        Self {
            path: target.path.clone(),
            behavior: target.behavior,
            encoding: target.encoding,
            status,
        }
    }
}

/// Outcome of a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub targets: Vec<TargetReport>,
}

impl RunReport {
    /// Check if any target failed.
    pub fn has_failures(&self) -> bool {
        self.targets
            .iter()
            .any(|t| matches!(t.status, TargetStatus::Failed { .. }))
    }

    /// Number of targets written.
    pub fn written(&self) -> usize {
        self.targets
            .iter()
            .filter(|t| matches!(t.status, TargetStatus::Written { .. }))
            .count()
    }
}

/// Merges upstream rule providers into target files.
pub struct Merger {
    fetcher: Box<dyn Fetcher>,
    converter: Box<dyn RulesetConverter>,
}

impl Merger {
    /// Create a merger from its two collaborators.
    pub fn new(
        fetcher: impl Fetcher + 'static,
        converter: impl RulesetConverter + 'static,
    ) -> Self {
        Self {
            fetcher: Box::new(fetcher),
            converter: Box::new(converter),
        }
    }

    fn loader(&self) -> SourceLoader<'_> {
        SourceLoader::new(self.fetcher.as_ref(), self.converter.as_ref())
    }

    /// Process every target. Never fails as a whole; per-target failures
    /// are in the report.
    pub fn run(&self, config: &Config) -> RunReport {
        let targets = thread::scope(|scope| {
            let handles: Vec<_> = config
                .targets
                .iter()
                .map(|target| (target, scope.spawn(move || self.merge_target(target))))
                .collect();

            handles
                .into_iter()
                .map(|(target, handle)| {
                    let status = match handle.join() {
                        Ok(Ok(report)) => return report,
                        Ok(Err(e)) => TargetStatus::Failed {
                            error: e.to_string(),
                        },
                        Err(_) => {
                            log::error!("Worker for {:?} panicked", target.path);
                            TargetStatus::Failed {
                                error: "worker panicked".to_string(),
                            }
                        }
                    };
                    TargetReport::new(target, status)
                })
                .collect()
        });

        RunReport { targets }
    }

    /// Merge one target and write its output.
    ///
    /// Unsupported behavior/encoding pairs are skipped without touching the
    /// filesystem. Write failures are logged and returned.
    pub fn merge_target(&self, target: &TargetDefinition) -> Result<TargetReport> {
        if let Err(e) = target.check_output() {
            log::warn!("Skipping {:?}: {}", target.path, e);
            return Ok(TargetReport::new(
                target,
                TargetStatus::Skipped {
                    reason: e.to_string(),
                },
            ));
        }

        let (merged, sources) = self.collect(target);

        if let Err(e) = self.write(target, &merged) {
            log::error!("Failed to write {:?}: {}", target.path, e);
            return Err(e);
        }

        log::info!(
            "Generated rule file: {:?}, {} rules",
            target.path,
            merged.len()
        );

        Ok(TargetReport::new(
            target,
            TargetStatus::Written {
                rules: merged.len(),
                sources,
            },
        ))
    }

    /// Load every source of `target` and merge the results.
    pub fn collect(&self, target: &TargetDefinition) -> (MergedRuleSet, Vec<SourceReport>) {
        let per_source: Vec<(String, Vec<String>)> = thread::scope(|scope| {
            let handles: Vec<_> = target
                .upstream
                .iter()
                .map(|(name, source)| {
                    let handle =
                        scope.spawn(move || self.process_source(name, source, target.behavior));
                    (name, handle)
                })
                .collect();

            handles
                .into_iter()
                .map(|(name, handle)| {
                    let rules = handle.join().unwrap_or_else(|_| {
                        log::error!("Worker for source {} panicked", name);
                        Vec::new()
                    });
                    (name.clone(), rules)
                })
                .collect()
        });

        let sources = per_source
            .iter()
            .map(|(name, rules)| SourceReport {
                name: name.clone(),
                rules: rules.len(),
            })
            .collect();
        let merged = per_source
            .into_iter()
            .flat_map(|(_, rules)| rules)
            .collect();

        (merged, sources)
    }

    /// Load one source and turn its lines into `target_behavior` rules.
    pub fn process_source(
        &self,
        name: &str,
        source: &RuleSource,
        target_behavior: Behavior,
    ) -> Vec<String> {
        let transform = Transform::lookup(source.behavior, target_behavior);
        if !transform.is_supported() {
            log::warn!(
                "Source {} is {} and cannot feed a {} target; it contributes no rules",
                name,
                source.behavior,
                target_behavior
            );
            return Vec::new();
        }

        let lines = self.loader().load(name, source);
        convert_lines(&lines, transform)
    }

    fn write(&self, target: &TargetDefinition, merged: &MergedRuleSet) -> Result<()> {
        let bytes = codec::encode(
            merged.rules(),
            target.encoding,
            target.behavior,
            self.converter.as_ref(),
        )?;
        write_output(&target.path, &bytes)
    }
}

/// Clean and transform raw lines, dropping blanks and rejects.
pub fn convert_lines<S: AsRef<str>>(lines: &[S], transform: Transform) -> Vec<String> {
    lines
        .iter()
        .filter_map(|line| {
            let cleaned = rule::clean(line.as_ref());
            if cleaned.is_empty() {
                return None;
            }
            let converted = transform.apply(cleaned);
            if converted.is_none() {
                log::debug!("Dropping rule {:?} ({:?})", cleaned, transform);
            }
            converted
        })
        .collect()
}

/// Write an output file, creating missing parent directories.
pub fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, bytes)?;
    Ok(())
}
