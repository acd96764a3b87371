//! File URL generation.
//!
//! # Responsibilities
//! - Turn a file URI (`public://a.png`, `core/misc/a.png`) into a CDN URL
//! - Decide which stream wrapper schemes are served from the CDN
//! - Produce far-future URLs for files with a known modification time
//!
//! # Design Decisions
//! - The host's file storage stays behind [`StreamWrapperRegistry`]
//! - `None` always means "use the regular, local URL"
//! - One settings snapshot is used for the whole call

use std::sync::Arc;

use crate::farfuture::codec::encode;
use crate::farfuture::token::TokenSigner;
use crate::mapping::resolver;
use crate::mapping::settings::{CdnSettings, SettingsSnapshot};
use crate::rewrite::site::SiteIdentity;

/// Stream wrappers known to the host application.
pub trait StreamWrapperRegistry: Send + Sync {
    /// Schemes of local, normal (publicly readable) stream wrappers.
    fn local_normal_schemes(&self) -> Vec<String>;

    /// Absolute external URL of a stream wrapper URI.
    fn external_url(&self, uri: &str) -> Option<String>;

    /// Modification time of the file behind `uri`, seconds since the epoch.
    fn mtime(&self, uri: &str) -> Option<u64>;
}

/// Scheme of `uri`, if it has the `scheme://` form.
pub fn uri_scheme(uri: &str) -> Option<&str> {
    let (scheme, _) = uri.split_once("://")?;
    let valid = !scheme.is_empty()
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then_some(scheme)
}

/// Generates CDN URLs for file URIs.
#[derive(Clone)]
pub struct FileUrlGenerator {
    settings: Arc<CdnSettings>,
    registry: Arc<dyn StreamWrapperRegistry>,
}

impl FileUrlGenerator {
    pub fn new(settings: Arc<CdnSettings>, registry: Arc<dyn StreamWrapperRegistry>) -> Self {
        Self { settings, registry }
    }

    /// Protocol-relative CDN URL for `uri`, or `None` to keep the local URL.
    pub fn generate(&self, uri: &str, site: &SiteIdentity) -> Option<String> {
        let snapshot = self.settings.snapshot();
        if !snapshot.config.status || uri.starts_with("//") {
            return None;
        }

        let scheme = uri_scheme(uri);
        let root_relative = match scheme {
            Some(scheme) => self.stream_root_relative(&snapshot, uri, scheme, site)?,
            None => format!("{}/{}", site.base_path(), uri.trim_start_matches('/')),
        };

        let domain = resolver::resolve(uri, &snapshot.table)?;

        if let Some(scheme) = scheme {
            if snapshot.config.farfuture.status {
                if let Some(path) = self.farfuture_path(&snapshot, uri, scheme) {
                    return Some(format!("//{}{}{}", domain, site.base_path(), path));
                }
            }
        }

        Some(format!("//{}{}", domain, root_relative))
    }

    fn stream_root_relative(
        &self,
        snapshot: &SettingsSnapshot,
        uri: &str,
        scheme: &str,
        site: &SiteIdentity,
    ) -> Option<String> {
        let served = snapshot.stream_wrappers(self.registry.as_ref());
        if !served.iter().any(|s| s == scheme) {
            return None;
        }

        let external = self.registry.external_url(uri)?;
        let root_relative = external
            .strip_prefix(&site.scheme_and_host())
            .unwrap_or(&external);
        if !root_relative.starts_with('/') {
            tracing::debug!(uri, external = %external, "External URL is not on this site");
            return None;
        }
        Some(root_relative.to_string())
    }

    fn farfuture_path(&self, snapshot: &SettingsSnapshot, uri: &str, scheme: &str) -> Option<String> {
        let mtime = self.registry.mtime(uri)?;
        let (_, relative_path) = uri.split_once("://")?;

        let signer = match TokenSigner::new(&snapshot.config.farfuture.secret) {
            Ok(signer) => signer,
            Err(e) => {
                tracing::warn!(error = %e, "Far-future enabled without a usable secret");
                return None;
            }
        };
        let token = signer.sign(mtime, scheme, relative_path);
        Some(encode(&token, mtime, scheme, relative_path))
    }
}

impl std::fmt::Debug for FileUrlGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileUrlGenerator")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
