//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! mapping, rewrite, farfuture produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters via the metrics facade)
//! ```
//!
//! # Design Decisions
//! - The library never installs a subscriber or recorder; the binary does
//! - Metrics are cheap (atomic increments) and safe on hot paths

pub mod logging;
pub mod metrics;
