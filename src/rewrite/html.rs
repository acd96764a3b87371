//! HTML asset URL rewriting.
//!
//! # Responsibilities
//! - Find image URLs of the current site in a piece of HTML
//! - Find links wrapping such images that point at the same type of file
//! - Replace their host with the CDN domain chosen by the resolver
//!
//! # Design Decisions
//! - Pattern-based substitution, no DOM: unmatched text passes through as is
//! - Two passes, in order: anchors wrapping images, then images. The anchor
//!   pass leaves the wrapped `<img>` untouched for the image pass
//! - All replacements of a pass are computed first and then applied in one
//!   sweep keyed by the matched text
//! - Output URLs are protocol-relative CDN URLs, which the site patterns
//!   never match again, so rewriting is idempotent

use std::collections::HashMap;
use regex::{Captures, Regex};

use crate::mapping::resolver::{self, file_extension};
use crate::mapping::settings::CdnSettings;
use crate::mapping::table::LookupTable;
use crate::observability::metrics;
use crate::rewrite::alter::AlterChain;
use crate::rewrite::site::{SiteIdentity, SitePatternCache, SitePatterns};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    AnchorImage,
    Image,
}

impl Pass {
    fn label(self) -> &'static str {
        match self {
            Pass::AnchorImage => "anchor",
            Pass::Image => "img",
        }
    }
}

/// Rewrites asset URLs in HTML documents.
///
/// Cheap to share: hold one per process and call it from any thread.
#[derive(Debug, Default)]
pub struct HtmlRewriter {
    patterns: SitePatternCache,
    alter: AlterChain,
}

impl HtmlRewriter {
    pub fn new(alter: AlterChain) -> Self {
        Self {
            patterns: SitePatternCache::new(),
            alter,
        }
    }

    pub fn patterns(&self) -> &SitePatternCache {
        &self.patterns
    }

    /// Rewrite using the current settings; returns the input unchanged when
    /// the CDN is disabled.
    pub fn rewrite_with(&self, html: &str, site: &SiteIdentity, settings: &CdnSettings) -> String {
        let snapshot = settings.snapshot();
        if !snapshot.config.status {
            return html.to_string();
        }
        self.rewrite(html, site, &snapshot.table)
    }

    /// Rewrite image file URLs (and links wrapping them) to the CDN.
    pub fn rewrite(&self, html: &str, site: &SiteIdentity, table: &LookupTable) -> String {
        let patterns = match self.patterns.get(site) {
            Ok(patterns) => patterns,
            Err(e) => {
                tracing::error!(error = %e, host = %site.host(), "Could not compile site URL patterns");
                return html.to_string();
            }
        };

        let html = self.apply_pass(html, patterns.anchor_image(), Pass::AnchorImage, site, table);
        self.apply_pass(&html, patterns.image(), Pass::Image, site, table)
    }

    fn apply_pass(
        &self,
        html: &str,
        regex: &Regex,
        pass: Pass,
        site: &SiteIdentity,
        table: &LookupTable,
    ) -> String {
        let mut replacements: HashMap<&str, String> = HashMap::new();

        for caps in regex.captures_iter(html) {
            let Some(whole) = caps.get(0) else { continue };
            if replacements.contains_key(whole.as_str()) {
                continue;
            }
            if let Some(replacement) = self.replacement(&caps, pass, site, table) {
                replacements.insert(whole.as_str(), replacement);
            }
        }

        if replacements.is_empty() {
            return html.to_string();
        }
        metrics::record_rewrites(pass.label(), replacements.len());

        regex
            .replace_all(html, |caps: &Captures| {
                let whole = &caps[0];
                replacements
                    .get(whole)
                    .cloned()
                    .unwrap_or_else(|| whole.to_string())
            })
            .into_owned()
    }

    fn replacement(
        &self,
        caps: &Captures,
        pass: Pass,
        site: &SiteIdentity,
        table: &LookupTable,
    ) -> Option<String> {
        let path = caps.name("path")?.as_str();
        if !SitePatterns::accepts(path) {
            return None;
        }

        if pass == Pass::AnchorImage {
            let compare = caps.name("compare")?.as_str();
            if !same_extension(path, compare) {
                return None;
            }
        }

        let url = self.cdn_url(path, site, table)?;
        let query = caps.name("query").map_or("", |m| m.as_str());

        Some(format!(
            "{}{}{}{}",
            &caps["open"],
            url,
            query,
            &caps["tail"]
        ))
    }

    /// CDN URL for a path relative to the site base, or `None` to keep the
    /// original URL.
    fn cdn_url(&self, path: &str, site: &SiteIdentity, table: &LookupTable) -> Option<String> {
        let altered = self.alter.apply(path);

        let root_relative = if altered == path {
            format!("{}/{}", site.base_path(), path)
        } else if altered.starts_with("//") || altered.contains("://") || !altered.starts_with('/') {
            // The hook produced the final URL itself.
            return Some(altered);
        } else {
            altered
        };

        let domain = resolver::resolve(&root_relative, table)?;
        Some(format!("//{}{}", domain, root_relative))
    }
}

/// Whether both paths end in the same file extension.
fn same_extension(path: &str, other: &str) -> bool {
    let extension = file_extension(path);
    !extension.is_empty() && extension == file_extension(other)
}
