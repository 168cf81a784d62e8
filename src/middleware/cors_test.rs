use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::Router;
use axum::routing::get;
use tower::ServiceExt;

use super::*;

fn app(policy: CorsPolicy, hits: Arc<AtomicUsize>) -> Router {
    let handler = move || {
        let hits = hits.clone();
        async move {
            hits.fetch_add(1, Ordering::SeqCst);
            "ok"
        }
    };
    Router::new()
        .route("/auth/session", get(handler.clone()))
        .route("/healthz", get(handler))
        .fallback(|| async { StatusCode::NOT_FOUND })
        .layer(axum::middleware::from_fn_with_state(policy, cors))
}

fn request(method: Method, uri: &str) -> Request {
    Request::builder().method(method).uri(uri).body(Body::empty()).unwrap()
}

fn assert_cors_headers(headers: &HeaderMap) {
    assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(headers[ACCESS_CONTROL_ALLOW_METHODS], "GET, POST, OPTIONS");
    assert_eq!(headers[ACCESS_CONTROL_ALLOW_HEADERS], "Content-Type, Authorization");
}

// =============================================================================
// Pre-flight
// =============================================================================

#[tokio::test]
async fn preflight_short_circuits_with_204() {
    let hits = Arc::new(AtomicUsize::new(0));
    let response = app(CorsPolicy::default(), hits.clone())
        .oneshot(request(Method::OPTIONS, "/auth/session"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_cors_headers(response.headers());
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(body.is_empty());
    assert_eq!(hits.load(Ordering::SeqCst), 0, "handler must not run on pre-flight");
}

#[tokio::test]
async fn preflight_outside_prefix_and_unknown_paths_also_204() {
    for uri in ["/healthz", "/no/such/route"] {
        let response = app(CorsPolicy::default(), Arc::new(AtomicUsize::new(0)))
            .oneshot(request(Method::OPTIONS, uri))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT, "{uri}");
        assert_cors_headers(response.headers());
    }
}

// =============================================================================
// Regular requests
// =============================================================================

#[tokio::test]
async fn prefixed_get_gets_headers_and_runs_handler() {
    let hits = Arc::new(AtomicUsize::new(0));
    let response = app(CorsPolicy::default(), hits.clone())
        .oneshot(request(Method::GET, "/auth/session"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_cors_headers(response.headers());
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unprefixed_get_has_no_cors_headers() {
    let response = app(CorsPolicy::default(), Arc::new(AtomicUsize::new(0)))
        .oneshot(request(Method::GET, "/healthz"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}

#[tokio::test]
async fn prefixed_error_responses_still_get_headers() {
    let response = app(CorsPolicy::default(), Arc::new(AtomicUsize::new(0)))
        .oneshot(request(Method::GET, "/auth/missing"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_cors_headers(response.headers());
}

#[tokio::test]
async fn custom_prefix_is_honoured() {
    let policy = CorsPolicy { prefix: "/health".into() };
    let response = app(policy, Arc::new(AtomicUsize::new(0)))
        .oneshot(request(Method::GET, "/healthz"))
        .await
        .unwrap();
    assert_cors_headers(response.headers());
}

// =============================================================================
// CorsPolicy
// =============================================================================

#[test]
fn default_prefix_is_auth() {
    assert_eq!(CorsPolicy::default().prefix, "/auth");
}

#[test]
fn applies_to_matches_prefix_only() {
    let policy = CorsPolicy::default();
    assert!(policy.applies_to("/auth"));
    assert!(policy.applies_to("/auth/callback/twitter"));
    assert!(!policy.applies_to("/api/auth"));
    assert!(!policy.applies_to("/"));
}
