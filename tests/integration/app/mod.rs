//! Infrastructure route tests: banner, health check, unknown-route fallback

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use serde_json::Value;
use tower::ServiceExt;

use crate::common::TestApp;

fn request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_text(response: axum::http::Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_root_banner() {
    let app = TestApp::new();

    let resp = app.router().oneshot(request(Method::GET, "/")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_text(resp).await, "Threadline AI Chat API!");
}

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new();

    let resp = app
        .router()
        .oneshot(request(Method::GET, "/health"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_text(resp).await, "OK");
}

#[tokio::test]
async fn test_unknown_route_returns_envelope_404() {
    let app = TestApp::new();

    let resp = app
        .router()
        .oneshot(request(Method::GET, "/api/unknown"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: Value = serde_json::from_str(&body_text(resp).await).unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Requested endpoint not found!");
}

#[tokio::test]
async fn test_unknown_route_any_method() {
    let app = TestApp::new();

    let resp = app
        .router()
        .oneshot(request(Method::POST, "/conversations"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: Value = serde_json::from_str(&body_text(resp).await).unwrap();
    assert_eq!(body["error"], "Requested endpoint not found!");
}
