mod middleware;
mod routes;
mod services;
mod state;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::middleware::cors::CorsPolicy;
use crate::services::auth::AuthConfig;
use crate::services::callbacks::UsernameEnrichment;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Missing OAuth credentials or signing secret is fatal: never serve
    // auth routes with a partial config.
    let config = match AuthConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "auth configuration invalid");
            std::process::exit(1);
        }
    };

    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()
        .expect("invalid PORT");

    let cookie_secure = routes::auth::cookie_secure(&config.twitter.redirect_uri);
    let cors = CorsPolicy::from_env();
    tracing::info!(
        client_id = %config.twitter.client_id,
        redirect_uri = %config.twitter.redirect_uri,
        cors_prefix = %cors.prefix,
        cookie_secure,
        "auth configured"
    );

    let state = state::AppState::new(config, Arc::new(UsernameEnrichment), cors, cookie_secure);
    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "avaxslap listening");
    axum::serve(listener, app).await.expect("server failed");
}
