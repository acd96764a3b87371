//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for CDN
//! integration. All types derive Serde traits for deserialization from
//! TOML files. Every section except `mapping` has defaults.

use serde::{Deserialize, Serialize};

use crate::mapping::MappingPolicy;
use crate::rewrite::SiteIdentity;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CdnConfig {
    /// Serve files from the CDN at all.
    #[serde(default)]
    pub status: bool,

    /// Mapping policy: which files go to which CDN domain(s).
    pub mapping: MappingPolicy,

    /// Extra stream wrapper schemes to serve, on top of the local ones.
    #[serde(default)]
    pub stream_wrappers: Vec<String>,

    /// Far-future expiration settings.
    #[serde(default)]
    pub farfuture: FarFutureConfig,

    /// Site the generated HTML belongs to.
    #[serde(default)]
    pub site: SiteConfig,

    /// Observability settings.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Far-future expiration configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct FarFutureConfig {
    /// Generate far-future URLs for stream wrapper files.
    pub status: bool,

    /// Site-wide secret used to sign far-future URLs.
    pub secret: String,
}

/// Site identity configuration (scheme, host, base path).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SiteConfig {
    /// "http" or "https".
    pub scheme: String,

    /// HTTP host, optionally with port (e.g., "example.com:8080").
    pub host: String,

    /// Base path without trailing slash; empty when installed at the root.
    pub base_path: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            scheme: "https".to_string(),
            host: "localhost".to_string(),
            base_path: String::new(),
        }
    }
}

impl SiteConfig {
    pub fn identity(&self) -> SiteIdentity {
        SiteIdentity::new(&self.scheme, &self.host, &self.base_path)
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
