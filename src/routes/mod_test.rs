use axum::body::Body;
use axum::http::header::{ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN};
use axum::http::{Method, Request};
use tower::ServiceExt;

use super::*;
use crate::state::test_helpers;

fn request(method: Method, uri: &str) -> Request<Body> {
    Request::builder().method(method).uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn healthz_ok_without_cors_headers() {
    let response = app(test_helpers::test_app_state())
        .oneshot(request(Method::GET, "/healthz"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}

#[tokio::test]
async fn unknown_route_is_404() {
    let response = app(test_helpers::test_app_state())
        .oneshot(request(Method::GET, "/nope"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn preflight_on_any_route_is_204_with_headers() {
    for uri in ["/auth/session", "/auth/callback/twitter", "/healthz", "/nope"] {
        let response = app(test_helpers::test_app_state())
            .oneshot(request(Method::OPTIONS, uri))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT, "{uri}");
        let headers = response.headers();
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_METHODS], "GET, POST, OPTIONS");
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_HEADERS], "Content-Type, Authorization");
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(body.is_empty());
    }
}

#[tokio::test]
async fn auth_routes_carry_cors_headers() {
    let response = app(test_helpers::test_app_state())
        .oneshot(request(Method::GET, "/auth/session"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}

#[tokio::test]
async fn signout_requires_post() {
    let response = app(test_helpers::test_app_state())
        .oneshot(request(Method::GET, "/auth/signout"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
