//! Mapping policy compilation.
//!
//! # Responsibilities
//! - Validate every domain in the policy
//! - Enforce structural rules per mapping type
//! - Flatten the policy tree into a [`LookupTable`]
//!
//! # Design Decisions
//! - Compilation is a pure function: MappingPolicy → Result<LookupTable, PolicyError>
//! - A complex mapping seeds its fallback under `*` first, then merges its
//!   nested mappings in order; when keys collide the later mapping wins
//! - Extension keys are lowercased on insertion

use thiserror::Error;

use crate::mapping::domain::is_valid_domain;
use crate::mapping::policy::{Conditions, MappingPolicy};
use crate::mapping::table::{LookupTable, Target, WILDCARD};

/// An invalid mapping policy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("Unknown CDN mapping type specified")]
    UnknownType,

    #[error("Invalid CDN domain '{0}': provide a host like 'cdn.com' or 'cdn.example.com'; IP addresses and ports are also allowed")]
    InvalidDomain(String),

    #[error("It does not make sense to apply auto-balancing to all files, regardless of extension")]
    BalancingAllFiles,

    #[error("An auto-balanced mapping needs at least one domain")]
    EmptyDomainSet,

    #[error("Both an 'extensions' condition and a negated 'extensions' condition were provided")]
    ConflictingConditions,

    #[error("Nested mapping {index} has no conditions, which is not allowed for complex mappings")]
    MissingConditions { index: usize },

    #[error("Nested mapping {index} has negated conditions, which is not allowed for complex mappings: the fallback domain already serves this purpose")]
    NegatedConditions { index: usize },
}

/// Compile a mapping policy into a lookup table.
pub fn compile(policy: &MappingPolicy) -> Result<LookupTable, PolicyError> {
    match policy {
        MappingPolicy::Simple { domain, conditions } => {
            compile_simple(domain, conditions.as_ref())
        }
        MappingPolicy::Complex { fallback_domain, domains } => {
            compile_complex(fallback_domain.as_deref(), domains)
        }
        MappingPolicy::AutoBalanced { domains, conditions } => {
            compile_auto_balanced(domains, conditions.as_ref())
        }
        MappingPolicy::Unknown => Err(PolicyError::UnknownType),
    }
}

fn validate_domain(domain: &str) -> Result<(), PolicyError> {
    if is_valid_domain(domain) {
        Ok(())
    } else {
        Err(PolicyError::InvalidDomain(domain.to_string()))
    }
}

fn compile_simple(domain: &str, conditions: Option<&Conditions>) -> Result<LookupTable, PolicyError> {
    validate_domain(domain)?;

    let mut table = LookupTable::new();
    let conditions = conditions.cloned().unwrap_or_default();

    if conditions.extensions.is_some() && conditions.not.is_some() {
        return Err(PolicyError::ConflictingConditions);
    }

    match conditions.included() {
        Some(extensions) => {
            for extension in extensions {
                table.insert(extension, Target::Domain(domain.to_string()));
            }
        }
        None => table.insert(WILDCARD, Target::Domain(domain.to_string())),
    }

    if let Some(excluded) = conditions.excluded() {
        for extension in excluded {
            table.insert(extension, Target::Excluded);
        }
    }

    Ok(table)
}

fn compile_complex(fallback_domain: Option<&str>, nested: &[MappingPolicy]) -> Result<LookupTable, PolicyError> {
    let mut table = LookupTable::new();

    if let Some(fallback) = fallback_domain {
        validate_domain(fallback)?;
        table.insert(WILDCARD, Target::Domain(fallback.to_string()));
    }

    for (index, mapping) in nested.iter().enumerate() {
        let conditions = match mapping.conditions() {
            Some(c) if !c.is_empty() => c,
            _ => return Err(PolicyError::MissingConditions { index }),
        };
        if conditions.not.is_some() {
            return Err(PolicyError::NegatedConditions { index });
        }
        table.merge(compile(mapping)?);
    }

    Ok(table)
}

fn compile_auto_balanced(domains: &[String], conditions: Option<&Conditions>) -> Result<LookupTable, PolicyError> {
    let extensions = conditions
        .and_then(Conditions::included)
        .ok_or(PolicyError::BalancingAllFiles)?;

    if domains.is_empty() {
        return Err(PolicyError::EmptyDomainSet);
    }
    for domain in domains {
        validate_domain(domain)?;
    }

    let mut table = LookupTable::new();
    for extension in extensions {
        table.insert(extension, Target::Balanced(domains.to_vec()));
    }
    Ok(table)
}
