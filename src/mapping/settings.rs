//! Live CDN settings with a cached, compiled lookup table.
//!
//! # Responsibilities
//! - Own the compiled lookup table for the current configuration
//! - Recompile on configuration change and swap atomically
//! - Answer enable flags, domain and stream wrapper questions
//!
//! # Design Decisions
//! - Readers load an `Arc<SettingsSnapshot>`; they never see a partial table
//! - A policy that fails to compile never replaces the live snapshot
//! - Each accepted snapshot gets a new version number

use std::sync::Arc;
use arc_swap::ArcSwap;

use crate::config::CdnConfig;
use crate::file_url::StreamWrapperRegistry;
use crate::mapping::compiler::{compile, PolicyError};
use crate::mapping::resolver;
use crate::mapping::table::LookupTable;
use crate::observability::metrics;

/// A compiled configuration, immutable once built.
#[derive(Debug)]
pub struct SettingsSnapshot {
    pub version: u64,
    pub config: CdnConfig,
    pub table: LookupTable,
}

/// Shared, hot-swappable CDN settings.
#[derive(Debug)]
pub struct CdnSettings {
    current: ArcSwap<SettingsSnapshot>,
}

impl CdnSettings {
    /// Compile `config` and create the settings holder.
    pub fn new(config: CdnConfig) -> Result<Self, PolicyError> {
        let snapshot = build_snapshot(config, 1)?;
        Ok(Self {
            current: ArcSwap::from_pointee(snapshot),
        })
    }

    /// Replace the configuration. Returns the new version.
    ///
    /// On error the previous snapshot stays in place.
    pub fn apply(&self, config: CdnConfig) -> Result<u64, PolicyError> {
        let version = self.current.load().version + 1;
        match build_snapshot(config, version) {
            Ok(snapshot) => {
                self.current.store(Arc::new(snapshot));
                tracing::info!(version, "CDN settings applied");
                Ok(version)
            }
            Err(e) => {
                tracing::error!(error = %e, "Rejected CDN mapping; keeping current settings");
                Err(e)
            }
        }
    }

    /// Current snapshot. Cheap; hold it for the duration of one document.
    pub fn snapshot(&self) -> Arc<SettingsSnapshot> {
        self.current.load_full()
    }

    pub fn version(&self) -> u64 {
        self.current.load().version
    }

    pub fn is_enabled(&self) -> bool {
        self.current.load().config.status
    }

    pub fn farfuture_is_enabled(&self) -> bool {
        self.current.load().config.farfuture.status
    }

    /// Unique CDN domains of the current policy.
    pub fn domains(&self) -> Vec<String> {
        self.current.load().table.domains()
    }

    /// Resolve a CDN domain for `uri` against the current table.
    pub fn resolve(&self, uri: &str) -> Option<String> {
        let snapshot = self.current.load();
        resolver::resolve(uri, &snapshot.table).map(str::to_string)
    }

    /// Stream wrapper schemes to serve from the CDN.
    pub fn stream_wrappers(&self, registry: &dyn StreamWrapperRegistry) -> Vec<String> {
        self.current.load().stream_wrappers(registry)
    }
}

impl SettingsSnapshot {
    /// All local-normal schemes of the registry, then the configured ones.
    pub fn stream_wrappers(&self, registry: &dyn StreamWrapperRegistry) -> Vec<String> {
        let mut schemes = registry.local_normal_schemes();
        for scheme in &self.config.stream_wrappers {
            if !schemes.contains(scheme) {
                schemes.push(scheme.clone());
            }
        }
        schemes
    }
}

fn build_snapshot(config: CdnConfig, version: u64) -> Result<SettingsSnapshot, PolicyError> {
    let table = match compile(&config.mapping) {
        Ok(table) => table,
        Err(e) => {
            metrics::record_policy_compilation(false);
            return Err(e);
        }
    };
    metrics::record_policy_compilation(true);
    tracing::debug!(version, entries = table.len(), "Compiled CDN lookup table");

    Ok(SettingsSnapshot {
        version,
        config,
        table,
    })
}
