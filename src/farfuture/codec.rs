//! Far-future path framing.
//!
//! Two inbound shapes are recognized:
//!
//! ```text
//! /cdn/ff/<token>/<mtime>/<scheme>/<relative path...>     (current)
//! /cdn/farfuture/<token>/<mtime>/<relative path...>       (legacy, no scheme)
//! ```
//!
//! The relative path is the last field and may contain `/`. Fields are
//! percent-encoded per segment; decoded values are returned.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

pub const PREFIX: &str = "/cdn/ff/";
pub const LEGACY_PREFIX: &str = "/cdn/farfuture/";

/// Query parameter carrying the root-relative file URL after normalization.
pub const FILE_URL_PARAM: &str = "root_relative_file_url";

/// Everything except unreserved characters is encoded within a segment.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Current,
    Legacy,
}

impl Shape {
    pub fn as_str(self) -> &'static str {
        match self {
            Shape::Current => "current",
            Shape::Legacy => "legacy",
        }
    }
}

/// A decoded far-future path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FarFuturePath {
    pub security_token: String,
    /// Modification time, seconds since the epoch.
    pub mtime: u64,
    /// Stream wrapper scheme; `None` for legacy paths.
    pub scheme: Option<String>,
    pub relative_path: String,
}

impl FarFuturePath {
    /// Decode `path`, or `None` if it is not a far-future path.
    pub fn decode(path: &str) -> Option<Self> {
        decode(path).map(|(decoded, _)| decoded)
    }

    /// Current-shape path for this value. A missing scheme is encoded as an
    /// empty segment.
    pub fn to_path(&self) -> String {
        encode(
            &self.security_token,
            self.mtime,
            self.scheme.as_deref().unwrap_or(""),
            &self.relative_path,
        )
    }
}

/// Decode `path`, returning the value and which shape it had.
pub fn decode(path: &str) -> Option<(FarFuturePath, Shape)> {
    if let Some(tail) = path.strip_prefix(PREFIX) {
        let mut fields = tail.splitn(4, '/');
        let token = fields.next()?;
        let mtime = fields.next()?;
        let scheme = fields.next()?;
        let rest = fields.next()?;
        build(token, mtime, Some(scheme), rest).map(|p| (p, Shape::Current))
    } else if let Some(tail) = path.strip_prefix(LEGACY_PREFIX) {
        let mut fields = tail.splitn(3, '/');
        let token = fields.next()?;
        let mtime = fields.next()?;
        let rest = fields.next()?;
        build(token, mtime, None, rest).map(|p| (p, Shape::Legacy))
    } else {
        None
    }
}

fn build(token: &str, mtime: &str, scheme: Option<&str>, rest: &str) -> Option<FarFuturePath> {
    let security_token = decode_segment(token);
    if security_token.is_empty() || rest.is_empty() {
        return None;
    }
    let mtime = mtime.parse::<u64>().ok()?;

    Some(FarFuturePath {
        security_token,
        mtime,
        scheme: scheme.map(decode_segment).filter(|s| !s.is_empty()),
        relative_path: decode_segment(rest),
    })
}

/// Build a current-shape far-future path.
pub fn encode(security_token: &str, mtime: u64, scheme: &str, relative_path: &str) -> String {
    format!(
        "{}{}/{}/{}/{}",
        PREFIX,
        encode_segment(security_token),
        mtime,
        encode_segment(scheme),
        encode_path(relative_path)
    )
}

/// Percent-encode each `/`-separated segment of `path`, keeping the slashes.
pub fn encode_path(path: &str) -> String {
    path.split('/')
        .map(encode_segment)
        .collect::<Vec<_>>()
        .join("/")
}

fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}

fn decode_segment(segment: &str) -> String {
    percent_decode_str(segment).decode_utf8_lossy().into_owned()
}

/// An inbound far-future request, normalized for routing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundFarFuture {
    /// Path to route on: `/cdn/ff/<token>/<mtime>/<scheme>`, or
    /// `/cdn/ff/<token>/<mtime>/` for legacy paths.
    pub route_path: String,
    /// Root-relative file URL, carried out of band in [`FILE_URL_PARAM`].
    pub file_url: String,
    pub path: FarFuturePath,
    pub shape: Shape,
}

/// Normalize an inbound request path. `None` means "not applicable": the
/// caller must leave the path untouched.
pub fn normalize_inbound(path: &str) -> Option<InboundFarFuture> {
    let (decoded, shape) = decode(path)?;

    let token = encode_segment(&decoded.security_token);
    let route_path = match &decoded.scheme {
        Some(scheme) => format!("{}{}/{}/{}", PREFIX, token, decoded.mtime, encode_segment(scheme)),
        None => format!("{}{}/{}/", PREFIX, token, decoded.mtime),
    };
    let file_url = format!("/{}", encode_path(&decoded.relative_path));

    Some(InboundFarFuture {
        route_path,
        file_url,
        path: decoded,
        shape,
    })
}
