//! Asset path → CDN domain resolution.
//!
//! # Responsibilities
//! - Extract the (lowercase) file extension of an asset path
//! - Look it up, falling back to the wildcard entry
//! - Pick one domain by consistent hashing when several are eligible
//!
//! # Design Decisions
//! - Never fails: paths without an extension use the `""` key and fall through
//! - Hashing uses the file name only, so the same file always lands on the
//!   same domain regardless of directory, request order or process

use crate::mapping::table::{LookupTable, Target};
use crate::observability::metrics;

/// Resolve the CDN domain for `uri`, or `None` to serve it locally.
pub fn resolve<'t>(uri: &str, table: &'t LookupTable) -> Option<&'t str> {
    let extension = file_extension(uri);

    let domain = match table.lookup(&extension) {
        Some(Target::Domain(domain)) => Some(domain.as_str()),
        Some(Target::Balanced(domains)) => {
            consistent_index(basename(uri), domains.len()).map(|i| domains[i].as_str())
        }
        Some(Target::Excluded) | None => None,
    };

    metrics::record_resolution(domain.is_some());
    domain
}

/// Last path segment, ignoring trailing slashes.
pub fn basename(uri: &str) -> &str {
    let trimmed = uri.trim_end_matches('/');
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

/// Lowercase extension of the last path segment, or `""` when there is none.
pub fn file_extension(uri: &str) -> String {
    let name = basename(uri);
    match name.rfind('.') {
        Some(pos) => name[pos + 1..].to_lowercase(),
        None => String::new(),
    }
}

/// Stable index in `0..len` for `filename`.
///
/// The first five hex digits of the MD5 digest (the top 20 bits) taken as an
/// unsigned integer, modulo `len`. Returns `None` for an empty list.
pub fn consistent_index(filename: &str, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let digest = md5::compute(filename.as_bytes()).0;
    let hash = (u32::from(digest[0]) << 12) | (u32::from(digest[1]) << 4) | (u32::from(digest[2]) >> 4);
    Some(hash as usize % len)
}
