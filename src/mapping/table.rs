//! Compiled lookup table: file extension → CDN target.

use std::collections::HashMap;
use serde::Serialize;

/// Key used for the generic or fallback mapping.
pub const WILDCARD: &str = "*";

/// What a table key maps to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Target {
    /// A single CDN domain.
    Domain(String),
    /// Several domains; one is picked per file by consistent hashing.
    /// Order is significant for the selection.
    Balanced(Vec<String>),
    /// Explicitly served locally, even if a wildcard mapping exists.
    Excluded,
}

/// Immutable extension → target table.
///
/// Keys are lowercase extensions without leading dot, or [`WILDCARD`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LookupTable {
    entries: HashMap<String, Target>,
}

impl LookupTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a target, normalizing the key to lowercase.
    /// An existing entry for the same key is replaced.
    pub(crate) fn insert(&mut self, key: &str, target: Target) {
        self.entries.insert(key.to_lowercase(), target);
    }

    /// Merge `other` into this table; entries of `other` win.
    pub(crate) fn merge(&mut self, other: LookupTable) {
        self.entries.extend(other.entries);
    }

    /// Target for an exact key.
    pub fn get(&self, key: &str) -> Option<&Target> {
        self.entries.get(key)
    }

    /// Target for an extension, falling back to the wildcard entry.
    pub fn lookup(&self, extension: &str) -> Option<&Target> {
        self.entries
            .get(extension)
            .or_else(|| self.entries.get(WILDCARD))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Target)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// All unique CDN domains in the table, sorted.
    pub fn domains(&self) -> Vec<String> {
        let mut domains: Vec<String> = self
            .entries
            .values()
            .flat_map(|target| match target {
                Target::Domain(domain) => vec![domain.clone()],
                Target::Balanced(domains) => domains.clone(),
                Target::Excluded => Vec::new(),
            })
            .collect();
        domains.sort();
        domains.dedup();
        domains
    }
}
