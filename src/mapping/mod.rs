//! Mapping subsystem: policy → lookup table → CDN domain.
//!
//! # Data Flow
//! ```text
//! MappingPolicy (from config)
//!     → compiler.rs (validate & flatten recursively)
//!     → LookupTable (extension | "*" → target)
//!     → settings.rs (cached snapshot, swapped on reload)
//!
//! Per asset:
//!     uri
//!     → resolver.rs (extension lookup, wildcard fallback)
//!     → consistent hash when several domains are eligible
//!     → Some(domain) | None
//! ```
//!
//! # Design Decisions
//! - Policy is a sum type compiled by structural recursion
//! - Tables are immutable once built; reloads swap the whole snapshot
//! - Resolution never fails: unmatched paths are served locally

pub mod compiler;
pub mod domain;
pub mod policy;
pub mod resolver;
pub mod settings;
pub mod table;

pub use compiler::{compile, PolicyError};
pub use domain::is_valid_domain;
pub use policy::{Conditions, MappingPolicy, NegatedConditions};
pub use resolver::resolve;
pub use settings::{CdnSettings, SettingsSnapshot};
pub use table::{LookupTable, Target, WILDCARD};
