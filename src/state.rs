//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! Everything in it is fixed at startup: the provider config, the cookie
//! key derived from `AUTH_SECRET`, the enrichment callbacks, and the CORS
//! policy. Handlers never mutate it.

use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;

use crate::middleware::cors::CorsPolicy;
use crate::services::auth::AuthConfig;
use crate::services::callbacks::AuthCallbacks;

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum — all inner fields are Arc-wrapped or Clone.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AuthConfig>,
    /// Encrypts the session, state, and PKCE cookies.
    pub key: Key,
    pub callbacks: Arc<dyn AuthCallbacks>,
    pub cors: CorsPolicy,
    /// Whether auth cookies carry the `Secure` attribute.
    pub cookie_secure: bool,
}

impl AppState {
    #[must_use]
    pub fn new(config: AuthConfig, callbacks: Arc<dyn AuthCallbacks>, cors: CorsPolicy, cookie_secure: bool) -> Self {
        let key = config.cookie_key();
        Self { config: Arc::new(config), key, callbacks, cors, cookie_secure }
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.key.clone()
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
