//! Inbound far-future request normalization.
//!
//! # Responsibilities
//! - Recognize far-future request paths before routing
//! - Rewrite them to `/cdn/ff/<token>/<mtime>/<scheme>` (or the legacy form)
//! - Move the file path into the `root_relative_file_url` query parameter
//! - Attach the decoded [`FarFuturePath`](crate::farfuture::FarFuturePath) as a request extension
//!
//! # Design Decisions
//! - Routers only allow a fixed number of path parameters, so the arbitrary
//!   depth file path travels in the query string
//! - Requests that are not far-future requests are passed on untouched

use std::task::{Context, Poll};
use axum::http::{uri::PathAndQuery, Request, Uri};
use tower::{Layer, Service};
use url::form_urlencoded;

use crate::farfuture::codec::{normalize_inbound, FILE_URL_PARAM};
use crate::observability::metrics;

/// Layer applying [`FarFutureService`]. Wrap the whole router with it so the
/// rewritten path is what gets routed.
#[derive(Debug, Clone, Copy, Default)]
pub struct FarFutureLayer;

impl FarFutureLayer {
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for FarFutureLayer {
    type Service = FarFutureService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        FarFutureService { inner }
    }
}

#[derive(Debug, Clone)]
pub struct FarFutureService<S> {
    inner: S,
}

impl<S, B> Service<Request<B>> for FarFutureService<S>
where
    S: Service<Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<B>) -> Self::Future {
        normalize_request(&mut req);
        self.inner.call(req)
    }
}

/// Normalize a far-future request in place. Returns true if the request was
/// rewritten.
pub fn normalize_request<B>(req: &mut Request<B>) -> bool {
    let Some(inbound) = normalize_inbound(req.uri().path()) else {
        return false;
    };

    let param = form_urlencoded::Serializer::new(String::new())
        .append_pair(FILE_URL_PARAM, &inbound.file_url)
        .finish();
    let path_and_query = match req.uri().query() {
        Some(query) if !query.is_empty() => format!("{}?{}&{}", inbound.route_path, query, param),
        _ => format!("{}?{}", inbound.route_path, param),
    };

    let mut parts = req.uri().clone().into_parts();
    parts.path_and_query = match path_and_query.parse::<PathAndQuery>() {
        Ok(pq) => Some(pq),
        Err(e) => {
            tracing::warn!(error = %e, path = %req.uri().path(), "Could not rebuild far-future URI");
            return false;
        }
    };
    let uri = match Uri::from_parts(parts) {
        Ok(uri) => uri,
        Err(e) => {
            tracing::warn!(error = %e, path = %req.uri().path(), "Could not rebuild far-future URI");
            return false;
        }
    };

    tracing::debug!(
        from = %req.uri().path(),
        to = %inbound.route_path,
        shape = inbound.shape.as_str(),
        "Normalized far-future request"
    );
    metrics::record_farfuture_request(inbound.shape.as_str());

    *req.uri_mut() = uri;
    req.extensions_mut().insert(inbound.path);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::farfuture::codec::FarFuturePath;

    #[test]
    fn test_normalize_current_request() {
        let mut req = Request::builder()
            .uri("/cdn/ff/tok/42/public/files/a%20b.png?v=1")
            .body(())
            .unwrap();

        assert!(normalize_request(&mut req));
        assert_eq!(req.uri().path(), "/cdn/ff/tok/42/public");
        assert_eq!(
            req.uri().query(),
            Some("v=1&root_relative_file_url=%2Ffiles%2Fa%2520b.png")
        );

        let decoded = req.extensions().get::<FarFuturePath>().unwrap();
        assert_eq!(decoded.relative_path, "files/a b.png");
    }

    #[test]
    fn test_other_requests_untouched() {
        let mut req = Request::builder()
            .uri("http://example.com/node/1?page=2")
            .body(())
            .unwrap();

        assert!(!normalize_request(&mut req));
        assert_eq!(req.uri().to_string(), "http://example.com/node/1?page=2");
        assert!(req.extensions().get::<FarFuturePath>().is_none());
    }
}
