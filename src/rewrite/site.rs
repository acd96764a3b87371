//! Site identity and compiled site URL patterns.
//!
//! # Responsibilities
//! - Describe the site a document belongs to (scheme, host, base path)
//! - Build the URL prefix alternatives that point at this site
//! - Compile the anchor and image patterns once per site identity
//!
//! # Design Decisions
//! - Prefixes are tried longest first: absolute, protocol-relative,
//!   root-relative, so a protocol-relative URL is never taken for a
//!   root-relative one
//! - Paths beginning with `/` after the prefix (other hosts) and far-future
//!   paths are rejected after matching, in `SitePatterns::accepts`
//! - The cache holds one entry per identity and never mixes identities

use std::sync::Arc;
use dashmap::DashMap;
use regex::Regex;

/// Far-future path prefixes, relative to the base path.
const FARFUTURE_PREFIXES: [&str; 2] = ["cdn/farfuture/", "cdn/ff/"];

/// The (scheme, host, base path) triple a document is rendered for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SiteIdentity {
    scheme: String,
    host: String,
    base_path: String,
}

impl SiteIdentity {
    /// `base_path` is the path the site is installed under, e.g. `""` or
    /// `"/drupal"`. A trailing slash is ignored.
    pub fn new(scheme: &str, host: &str, base_path: &str) -> Self {
        Self {
            scheme: scheme.to_lowercase(),
            host: host.to_lowercase(),
            base_path: base_path.trim_end_matches('/').to_string(),
        }
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// `scheme://host`, as it appears at the start of absolute URLs.
    pub fn scheme_and_host(&self) -> String {
        format!("{}://{}", self.scheme, self.host)
    }

    /// Absolute, protocol-relative and root-relative URL prefixes of this site.
    pub fn url_prefixes(&self) -> [String; 3] {
        [
            format!("{}://{}{}/", self.scheme, self.host, self.base_path),
            format!("//{}{}/", self.host, self.base_path),
            format!("{}/", self.base_path),
        ]
    }
}

/// Compiled patterns for one site.
#[derive(Debug)]
pub struct SitePatterns {
    identity: SiteIdentity,
    anchor_image: Regex,
    image: Regex,
}

impl SitePatterns {
    pub fn compile(identity: SiteIdentity) -> Result<Self, regex::Error> {
        let prefix = identity
            .url_prefixes()
            .iter()
            .map(|p| regex::escape(p))
            .collect::<Vec<_>>()
            .join("|");

        // <a href="PREFIX path ?query" ...> directly wrapping <img src="...">
        let anchor_image = Regex::new(&format!(
            concat!(
                r#"(?i)(?P<open><a\s+(?:[^>]*?\s+)?href\s*=\s*["'])(?:{prefix})"#,
                r#"(?P<path>[^"'?]*)(?P<query>\?[^"']*)?"#,
                r#"(?P<tail>["'][^>]*>\s*<img\s+(?:[^>]*?\s+)?src\s*=\s*["']"#,
                r#"(?P<compare>[^"'?]*)(?:\?[^"']*)?["'])"#,
            ),
            prefix = prefix
        ))?;

        // <img src="PREFIX path ?query">
        let image = Regex::new(&format!(
            concat!(
                r#"(?i)(?P<open><img\s+(?:[^>]*?\s+)?src\s*=\s*["'])(?:{prefix})"#,
                r#"(?P<path>[^"'?]*)(?P<query>\?[^"']*)?(?P<tail>["'])"#,
            ),
            prefix = prefix
        ))?;

        tracing::debug!(
            scheme = %identity.scheme,
            host = %identity.host,
            base_path = %identity.base_path,
            "Compiled site URL patterns"
        );

        Ok(Self {
            identity,
            anchor_image,
            image,
        })
    }

    pub fn identity(&self) -> &SiteIdentity {
        &self.identity
    }

    pub fn anchor_image(&self) -> &Regex {
        &self.anchor_image
    }

    pub fn image(&self) -> &Regex {
        &self.image
    }

    /// Whether a path captured after the site prefix may be rewritten.
    ///
    /// Rejects paths that are really protocol-relative URLs to another host
    /// and paths that already are far-future URLs.
    pub fn accepts(path: &str) -> bool {
        !path.starts_with('/') && !FARFUTURE_PREFIXES.iter().any(|p| path.starts_with(p))
    }
}

/// Compiled patterns keyed by site identity.
#[derive(Debug, Default)]
pub struct SitePatternCache {
    entries: DashMap<SiteIdentity, Arc<SitePatterns>>,
}

impl SitePatternCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Patterns for `identity`, compiling them on first use.
    pub fn get(&self, identity: &SiteIdentity) -> Result<Arc<SitePatterns>, regex::Error> {
        if let Some(patterns) = self.entries.get(identity) {
            return Ok(patterns.value().clone());
        }

        let compiled = Arc::new(SitePatterns::compile(identity.clone())?);
        let entry = self.entries.entry(identity.clone()).or_insert(compiled);
        Ok(entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every compiled entry.
    pub fn clear(&self) {
        self.entries.clear();
    }
}
