//! Far-future expiration URLs.
//!
//! # Data Flow
//! ```text
//! Outbound (URL generation):
//!     mtime + scheme + relative path
//!     → token.rs (HMAC token)
//!     → codec.rs encode → /cdn/ff/<token>/<mtime>/<scheme>/<path>
//!
//! Inbound (request handling):
//!     /cdn/ff/... or /cdn/farfuture/...
//!     → layer.rs (before routing)
//!     → codec.rs normalize_inbound
//!     → route path + root_relative_file_url query parameter
//!     → handler verifies token via token.rs
//! ```
//!
//! # Design Decisions
//! - Decoding never fails: unknown shapes are "not applicable"
//! - Output always uses the current `/cdn/ff/` shape
//! - Legacy `/cdn/farfuture/` paths are still accepted

pub mod codec;
pub mod layer;
pub mod token;

pub use codec::{decode, encode, normalize_inbound, FarFuturePath, InboundFarFuture, Shape};
pub use layer::{FarFutureLayer, FarFutureService};
pub use token::{SignerError, TokenSigner};
