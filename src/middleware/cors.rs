//! Cross-origin headers for the auth routes.
//!
//! Pre-flight `OPTIONS` requests are answered here with `204 No Content` and
//! never reach the router. Other requests run normally; if their path falls
//! under the configured prefix the response gets the permissive headers.
//! There is no origin allow-list and no credentials mode.

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

pub const DEFAULT_PREFIX: &str = "/auth";
pub const ALLOW_ORIGIN: &str = "*";
pub const ALLOW_METHODS: &str = "GET, POST, OPTIONS";
pub const ALLOW_HEADERS: &str = "Content-Type, Authorization";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsPolicy {
    /// Path prefix whose responses get CORS headers.
    pub prefix: String,
}

impl Default for CorsPolicy {
    fn default() -> Self {
        Self { prefix: DEFAULT_PREFIX.into() }
    }
}

impl CorsPolicy {
    /// Load from `CORS_PATH_PREFIX`, defaulting to `/auth`.
    #[must_use]
    pub fn from_env() -> Self {
        std::env::var("CORS_PATH_PREFIX")
            .ok()
            .map(|raw| raw.trim().to_owned())
            .filter(|prefix| prefix.starts_with('/'))
            .map_or_else(Self::default, |prefix| Self { prefix })
    }

    #[must_use]
    pub fn applies_to(&self, path: &str) -> bool {
        path.starts_with(&self.prefix)
    }
}

fn apply_headers(headers: &mut HeaderMap) {
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static(ALLOW_ORIGIN));
    headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(ALLOW_METHODS));
    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static(ALLOW_HEADERS));
}

/// Axum middleware; install with `from_fn_with_state(policy, cors)`.
pub async fn cors(State(policy): State<CorsPolicy>, request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        tracing::debug!(path = %request.uri().path(), "cors pre-flight");
        let mut response = (StatusCode::NO_CONTENT, Body::empty()).into_response();
        apply_headers(response.headers_mut());
        return response;
    }

    let in_scope = policy.applies_to(request.uri().path());
    let mut response = next.run(request).await;
    if in_scope {
        apply_headers(response.headers_mut());
    }
    response
}

#[cfg(test)]
#[path = "cors_test.rs"]
mod tests;
