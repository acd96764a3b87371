//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use cdn_rewriter::config::loader::parse_config;
use cdn_rewriter::{CdnSettings, SiteIdentity, StreamWrapperRegistry};

pub const SECRET: &str = "integration-secret";
pub const MTIME: u64 = 1_500_000_000;

/// Build live settings from TOML text; panics on invalid config.
pub fn settings(toml: &str) -> Arc<CdnSettings> {
    let config = parse_config(toml).unwrap();
    Arc::new(CdnSettings::new(config).unwrap())
}

pub fn site() -> SiteIdentity {
    SiteIdentity::new("https", "example.com", "")
}

/// Registry with a `public` local scheme under `/sites/default/files`.
pub struct LocalFiles;

impl StreamWrapperRegistry for LocalFiles {
    fn local_normal_schemes(&self) -> Vec<String> {
        vec!["public".into()]
    }

    fn external_url(&self, uri: &str) -> Option<String> {
        let path = uri.strip_prefix("public://")?;
        Some(format!("https://example.com/sites/default/files/{}", path))
    }

    fn mtime(&self, uri: &str) -> Option<u64> {
        uri.starts_with("public://").then_some(MTIME)
    }
}
