//! HTML rewriting subsystem.
//!
//! # Data Flow
//! ```text
//! HTML text + SiteIdentity (scheme, host, base path)
//!     → site.rs (cached URL prefix patterns for this site)
//!     → html.rs pass 1: <a href> wrapping <img> of the same file type
//!     → html.rs pass 2: <img src>
//!         per match: strip prefix → alter.rs hooks → resolver → //cdn/path?query
//!     → rewritten HTML
//! ```
//!
//! # Design Decisions
//! - Targeted regex substitution instead of a DOM parse
//! - Patterns compiled once per site identity and shared across documents
//! - Hooks are explicit values composed by the caller

pub mod alter;
pub mod html;
pub mod site;

pub use alter::{AlterChain, PathAlter};
pub use html::HtmlRewriter;
pub use site::{SiteIdentity, SitePatternCache, SitePatterns};
