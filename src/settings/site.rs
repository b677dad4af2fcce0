//! Per-site configuration lookup
//!
//! Every pattern whose regex matches anywhere in the URL contributes its
//! fields. Entries apply in ascending priority, so the highest priority wins
//! each field it sets. Equal priorities keep declaration order.

use indexmap::IndexMap;
use regex::Regex;

use super::{Diagnostic, SiteConfig};
use crate::error::{ConfigError, Result};

#[derive(Debug, Clone)]
struct SiteEntry {
    pattern: String,
    regex: Regex,
    config: SiteConfig,
}

/// Compiled site patterns, in declaration order
#[derive(Debug, Clone, Default)]
pub struct SiteTable {
    entries: Vec<SiteEntry>,
}

impl SiteTable {
    /// Compile every pattern. Invalid regexes are left out of the table and
    /// reported.
    pub fn new(sites: &IndexMap<String, SiteConfig>) -> (Self, Vec<Diagnostic>) {
        let mut entries = Vec::with_capacity(sites.len());
        let mut diagnostics = Vec::new();

        for (pattern, config) in sites {
            match Regex::new(pattern) {
                Ok(regex) => entries.push(SiteEntry {
                    pattern: pattern.clone(),
                    regex,
                    config: config.clone(),
                }),
                Err(e) => diagnostics.push(Diagnostic::InvalidPattern {
                    pattern: pattern.clone(),
                    message: e.to_string(),
                }),
            }
        }

        (Self { entries }, diagnostics)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Matching entries, lowest priority first
    fn matching(&self, url: &str) -> Vec<&SiteEntry> {
        let mut matches: Vec<&SiteEntry> = self
            .entries
            .iter()
            .filter(|entry| entry.regex.is_match(url))
            .collect();
        matches.sort_by(|a, b| {
            a.config
                .priority_or_default()
                .total_cmp(&b.config.priority_or_default())
        });
        matches
    }

    /// Patterns matching `url`, in the order they are applied
    pub fn matching_patterns(&self, url: &str) -> Vec<&str> {
        self.matching(url)
            .into_iter()
            .map(|entry| entry.pattern.as_str())
            .collect()
    }

    /// Fold every matching entry into one configuration
    pub fn resolve(&self, url: &str) -> SiteConfig {
        let resolved = self
            .matching(url)
            .into_iter()
            .fold(SiteConfig::default(), |mut acc, entry| {
                acc.merge_from(&entry.config);
                acc
            });
        tracing::trace!(url, ?resolved, "resolved site configuration");
        resolved
    }
}

/// Resolve `url` against a loaded table; fails when nothing has been loaded.
pub fn resolve(url: &str, table: Option<&SiteTable>) -> Result<SiteConfig> {
    table
        .map(|table| table.resolve(url))
        .ok_or(ConfigError::Uninitialized)
}
