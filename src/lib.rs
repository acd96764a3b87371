//! CDN asset URL rewriting library.

pub mod config;
pub mod farfuture;
pub mod file_url;
pub mod mapping;
pub mod observability;
pub mod rewrite;

pub use config::schema::CdnConfig;
pub use farfuture::{FarFutureLayer, FarFuturePath, TokenSigner};
pub use file_url::{FileUrlGenerator, StreamWrapperRegistry};
pub use mapping::{CdnSettings, LookupTable, MappingPolicy};
pub use rewrite::{HtmlRewriter, SiteIdentity};
