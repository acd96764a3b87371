//! Rewriter metrics.
//!
//! # Metrics
//! - `cdn_resolutions_total` (counter): domain lookups by outcome (`hit`, `miss`)
//! - `cdn_rewrites_total` (counter): URLs rewritten by pass (`anchor`, `img`)
//! - `cdn_policy_compilations_total` (counter): compilations by result (`ok`, `error`)
//! - `cdn_farfuture_requests_total` (counter): normalized requests by shape
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op
//! - Label values are static strings, so no allocation per update

use metrics::{counter, describe_counter};

/// Register metric descriptions with the installed recorder.
pub fn describe() {
    describe_counter!("cdn_resolutions_total", "CDN domain lookups by outcome");
    describe_counter!("cdn_rewrites_total", "Asset URLs rewritten to the CDN by pass");
    describe_counter!(
        "cdn_policy_compilations_total",
        "Mapping policy compilations by result"
    );
    describe_counter!(
        "cdn_farfuture_requests_total",
        "Far-future requests normalized by path shape"
    );
}

pub fn record_resolution(hit: bool) {
    let outcome = if hit { "hit" } else { "miss" };
    counter!("cdn_resolutions_total", "outcome" => outcome).increment(1);
}

pub fn record_rewrites(pass: &'static str, count: usize) {
    counter!("cdn_rewrites_total", "pass" => pass).increment(count as u64);
}

pub fn record_policy_compilation(ok: bool) {
    let result = if ok { "ok" } else { "error" };
    counter!("cdn_policy_compilations_total", "result" => result).increment(1);
}

pub fn record_farfuture_request(shape: &'static str) {
    counter!("cdn_farfuture_requests_total", "shape" => shape).increment(1);
}
