//! Far-future request handling through the tower layer and an axum router.

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{Request, StatusCode};
use axum::routing::get;
use axum::{Extension, Router};
use tower::{Layer, ServiceExt};

use cdn_rewriter::farfuture::{self, FarFutureLayer, FarFuturePath, TokenSigner};

mod common;

async fn serve_file(
    State(signer): State<Arc<TokenSigner>>,
    Extension(path): Extension<FarFuturePath>,
    Query(query): Query<HashMap<String, String>>,
) -> (StatusCode, String) {
    if !signer.verify(&path) {
        return (StatusCode::FORBIDDEN, String::new());
    }
    let file_url = query.get("root_relative_file_url").cloned().unwrap_or_default();
    (
        StatusCode::OK,
        format!("{}|{}", path.scheme.as_deref().unwrap_or(""), file_url),
    )
}

fn router() -> Router {
    let signer = Arc::new(TokenSigner::new(common::SECRET).unwrap());
    Router::new()
        .route("/cdn/ff/{token}/{mtime}/{scheme}", get(serve_file))
        .route("/cdn/ff/{token}/{mtime}/", get(serve_file))
        .route("/sites/{*rest}", get(|| async { "local" }))
        .with_state(signer)
}

async fn call(uri: &str) -> (StatusCode, String) {
    let app = FarFutureLayer::new().layer(router());
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

fn signed(scheme: &str, relative_path: &str) -> String {
    TokenSigner::new(common::SECRET)
        .unwrap()
        .sign(common::MTIME, scheme, relative_path)
}

#[tokio::test]
async fn test_current_shape_is_routed() {
    let path = farfuture::encode(
        &signed("public", "styles/thumb/my photo.jpg"),
        common::MTIME,
        "public",
        "styles/thumb/my photo.jpg",
    );

    let (status, body) = call(&path).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "public|/styles/thumb/my%20photo.jpg");
}

#[tokio::test]
async fn test_legacy_shape_is_routed() {
    let token = signed("", "sites/default/files/a.png");
    let path = format!("/cdn/farfuture/{}/{}/sites/default/files/a.png", token, common::MTIME);

    let (status, body) = call(&path).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "|/sites/default/files/a.png");
}

#[tokio::test]
async fn test_tampered_path_is_forbidden() {
    let token = signed("public", "a.png");
    let path = format!("/cdn/ff/{}/{}/public/b.png", token, common::MTIME);

    let (status, _) = call(&path).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_other_paths_pass_through() {
    let (status, body) = call("/sites/default/files/a.png").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "local");

    // Not a far-future path: left alone, so nothing routes it.
    let (status, _) = call("/cdn/ff/tok/yesterday/public/a.png").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
