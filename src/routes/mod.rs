//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! All auth endpoints live under `/auth`. The CORS layer wraps the whole
//! router, fallback included, so pre-flight requests are answered for any
//! path before routing happens.

pub mod auth;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::middleware::cors;
use crate::services::auth::pages;
use crate::state::AppState;

/// Build the full application router.
pub fn app(state: AppState) -> Router {
    let cors_policy = state.cors.clone();

    Router::new()
        .route(pages::SIGN_IN, get(auth::signin))
        .route(pages::CALLBACK, get(auth::callback))
        .route(pages::SESSION, get(auth::session))
        .route(pages::SIGN_OUT, post(auth::signout))
        .route(pages::ERROR, get(auth::error_page))
        .route("/healthz", get(healthz))
        .fallback(not_found)
        .layer(axum::middleware::from_fn_with_state(cors_policy, cors::cors))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
