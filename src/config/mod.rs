//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks, mapping compiles)
//!     → CdnConfig (validated, immutable)
//!     → CdnSettings::apply (compile & swap snapshot)
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → sent to the owner of CdnSettings
//!     → atomic swap of Arc<SettingsSnapshot>
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All sections except the mapping have defaults
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use schema::CdnConfig;
pub use schema::FarFutureConfig;
pub use schema::ObservabilityConfig;
pub use schema::SiteConfig;
