//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - The mapping policy must compile
//! - Far-future URLs need a signing secret
//! - Site identity must be usable to build URL prefixes
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: CdnConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;

use crate::config::schema::CdnConfig;
use crate::mapping::{compile, is_valid_domain, PolicyError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid mapping: {0}")]
    Policy(#[from] PolicyError),

    #[error("Far-future expiration is enabled but no secret is configured")]
    MissingFarFutureSecret,

    #[error("Site scheme must be 'http' or 'https', got '{0}'")]
    InvalidSiteScheme(String),

    #[error("Site host '{0}' is not a valid host")]
    InvalidSiteHost(String),

    #[error("Site base path '{0}' must be empty or start with '/' and not end with '/'")]
    InvalidBasePath(String),

    #[error("Stream wrapper scheme '{0}' is not valid")]
    InvalidStreamWrapper(String),
}

/// Validate a parsed configuration.
pub fn validate_config(config: &CdnConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = compile(&config.mapping) {
        errors.push(ValidationError::Policy(e));
    }

    if config.farfuture.status && config.farfuture.secret.is_empty() {
        errors.push(ValidationError::MissingFarFutureSecret);
    }

    let site = &config.site;
    if site.scheme != "http" && site.scheme != "https" {
        errors.push(ValidationError::InvalidSiteScheme(site.scheme.clone()));
    }
    if !is_valid_domain(&site.host) || site.host.contains('@') {
        errors.push(ValidationError::InvalidSiteHost(site.host.clone()));
    }
    if !site.base_path.is_empty()
        && (!site.base_path.starts_with('/') || site.base_path.ends_with('/'))
    {
        errors.push(ValidationError::InvalidBasePath(site.base_path.clone()));
    }

    for scheme in &config.stream_wrappers {
        let valid = !scheme.is_empty()
            && scheme.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
        if !valid {
            errors.push(ValidationError::InvalidStreamWrapper(scheme.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
