//! Auth routes — Twitter OAuth2 + PKCE flow, session read, sign-out.
//!
//! Every piece of per-user state lives in encrypted cookies: the CSRF state
//! and PKCE verifier for the duration of one sign-in, then the token for the
//! lifetime of the session. Nothing is stored server-side.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, PrivateCookieJar, SameSite};
use serde::Deserialize;
use time::format_description::well_known::Rfc3339;
use time::{Duration, OffsetDateTime};

use crate::services::auth::{self as auth_svc, pages};
use crate::services::callbacks::{Session, Token, UserIdentity};
use crate::services::pkce::{self, PkceVerifier};
use crate::state::AppState;

pub(crate) const SESSION_COOKIE_NAME: &str = "authjs.session-token";
pub(crate) const STATE_COOKIE_NAME: &str = "authjs.state";
pub(crate) const PKCE_COOKIE_NAME: &str = "authjs.pkce.code_verifier";

const SESSION_MAX_AGE: Duration = Duration::days(30);
const FLOW_COOKIE_MAX_AGE: Duration = Duration::minutes(15);

pub(crate) fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .and_then(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
}

/// `COOKIE_SECURE` wins; otherwise infer from the redirect URI scheme.
pub(crate) fn cookie_secure(redirect_uri: &str) -> bool {
    env_bool("COOKIE_SECURE").unwrap_or_else(|| redirect_uri.starts_with("https://"))
}

fn auth_cookie(name: &'static str, value: String, secure: bool, max_age: Duration) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(max_age)
        .build()
}

/// Removal goes through `remove` so the jar emits a plaintext empty cookie
/// with `Max-Age=0`; `add` would encrypt the empty value.
fn remove_cookie(jar: PrivateCookieJar, name: &'static str) -> PrivateCookieJar {
    jar.remove(Cookie::build(name).path("/"))
}

fn clear_flow_cookies(jar: PrivateCookieJar) -> PrivateCookieJar {
    remove_cookie(remove_cookie(jar, STATE_COOKIE_NAME), PKCE_COOKIE_NAME)
}

// =============================================================================
// ERROR CODES
// =============================================================================

/// Codes passed to the error page as `?error=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// The user declined consent at the provider.
    AccessDenied,
    /// The provider redirected back with an error or without a code.
    OAuthCallback,
    /// CSRF state or PKCE verifier cookie missing or mismatched.
    InvalidState,
    /// Token exchange or profile fetch failed.
    OAuthExchange,
    Configuration,
}

impl ErrorCode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AccessDenied => "AccessDenied",
            Self::OAuthCallback => "OAuthCallback",
            Self::InvalidState => "InvalidState",
            Self::OAuthExchange => "OAuthExchange",
            Self::Configuration => "Configuration",
        }
    }

    fn redirect(self) -> Redirect {
        Redirect::temporary(&format!("{}?error={}", pages::ERROR, self.as_str()))
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

/// `GET /auth/signin` — start a sign-in: stash state + verifier, redirect to Twitter.
pub async fn signin(State(state): State<AppState>, jar: PrivateCookieJar) -> Response {
    let verifier = PkceVerifier::generate();
    let oauth_state = pkce::generate_state();

    let url = match state.config.twitter.authorize_url(&oauth_state, &verifier) {
        Ok(url) => url,
        Err(e) => {
            tracing::error!(error = %e, "cannot build authorization url");
            return ErrorCode::Configuration.redirect().into_response();
        }
    };

    let secure = state.cookie_secure;
    let jar = jar
        .add(auth_cookie(STATE_COOKIE_NAME, oauth_state, secure, FLOW_COOKIE_MAX_AGE))
        .add(auth_cookie(PKCE_COOKIE_NAME, verifier.as_str().to_owned(), secure, FLOW_COOKIE_MAX_AGE));
    (jar, Redirect::temporary(url.as_str())).into_response()
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

/// `GET /auth/callback/twitter` — verify state, exchange code, set session cookie.
pub async fn callback(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Query(params): Query<CallbackQuery>,
) -> Response {
    let secure = state.cookie_secure;
    let expected_state = jar.get(STATE_COOKIE_NAME).map(|c| c.value().to_owned());
    let verifier = jar
        .get(PKCE_COOKIE_NAME)
        .map(|c| PkceVerifier::from_string(c.value().to_owned()));
    let jar = clear_flow_cookies(jar);

    if let Some(error) = params.error.as_deref() {
        tracing::warn!(%error, "provider returned an authorization error");
        let code = if error == "access_denied" { ErrorCode::AccessDenied } else { ErrorCode::OAuthCallback };
        return (jar, code.redirect()).into_response();
    }

    let Some(code) = params.code.as_deref() else {
        return (jar, ErrorCode::OAuthCallback.redirect()).into_response();
    };

    let state_matches = matches!(
        (expected_state.as_deref(), params.state.as_deref()),
        (Some(expected), Some(got)) if !expected.is_empty() && expected == got
    );
    let Some(verifier) = verifier.filter(|_| state_matches) else {
        tracing::warn!("oauth state or pkce verifier mismatch");
        return (jar, ErrorCode::InvalidState.redirect()).into_response();
    };

    let twitter = &state.config.twitter;
    let grant = match auth_svc::exchange_code(twitter, code, &verifier).await {
        Ok(grant) => grant,
        Err(e) => {
            tracing::error!(error = %e, "oauth code exchange failed");
            return (jar, ErrorCode::OAuthExchange.redirect()).into_response();
        }
    };

    tracing::debug!(scope = ?grant.scope, expires_in = ?grant.expires_in, "token granted");

    let profile = match auth_svc::fetch_twitter_profile(twitter, &grant.access_token).await {
        Ok(profile) => profile,
        Err(e) => {
            tracing::error!(error = %e, "twitter profile fetch failed");
            return (jar, ErrorCode::OAuthExchange.redirect()).into_response();
        }
    };

    let identity = UserIdentity::from(&profile);
    let now = OffsetDateTime::now_utc().unix_timestamp();
    let token = state
        .callbacks
        .on_token(auth_svc::build_token(&identity, grant, now), Some(&identity));

    let value = match serde_json::to_string(&token) {
        Ok(value) => value,
        Err(e) => {
            tracing::error!(error = %e, "token serialization failed");
            return (jar, ErrorCode::OAuthExchange.redirect()).into_response();
        }
    };

    tracing::info!(sub = %token.sub, username = ?token.username, "signed in");
    let jar = jar.add(auth_cookie(SESSION_COOKIE_NAME, value, secure, SESSION_MAX_AGE));
    (jar, Redirect::temporary("/")).into_response()
}

/// `GET /auth/session` — current session, enriched; `{}` when signed out.
pub async fn session(State(state): State<AppState>, jar: PrivateCookieJar) -> Response {
    let secure = state.cookie_secure;
    let Some(raw) = jar.get(SESSION_COOKIE_NAME).map(|c| c.value().to_owned()) else {
        return Json(serde_json::json!({})).into_response();
    };

    let token: Token = match serde_json::from_str(&raw) {
        Ok(token) => token,
        Err(e) => {
            tracing::warn!(error = %e, "discarding undecodable session cookie");
            let jar = remove_cookie(jar, SESSION_COOKIE_NAME);
            return (jar, Json(serde_json::json!({}))).into_response();
        }
    };

    let token = state.callbacks.on_token(token, None);
    let expires = (OffsetDateTime::now_utc() + SESSION_MAX_AGE)
        .format(&Rfc3339)
        .unwrap_or_default();
    let session = state
        .callbacks
        .on_session(Session::from_token(&token, expires), &token);

    // Rolling expiry: re-issue the cookie on every read.
    let jar = match serde_json::to_string(&token) {
        Ok(value) => jar.add(auth_cookie(SESSION_COOKIE_NAME, value, secure, SESSION_MAX_AGE)),
        Err(e) => {
            tracing::warn!(error = %e, "token re-serialization failed, cookie not refreshed");
            jar
        }
    };
    (jar, Json(session)).into_response()
}

/// `POST /auth/signout` — clear the session cookie.
pub async fn signout(jar: PrivateCookieJar) -> impl IntoResponse {
    let jar = remove_cookie(jar, SESSION_COOKIE_NAME);
    (jar, StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct ErrorQuery {
    error: Option<String>,
}

/// `GET /auth/error` — terminal page for failed sign-ins.
pub async fn error_page(Query(params): Query<ErrorQuery>) -> impl IntoResponse {
    let code = params.error.unwrap_or_else(|| "Unknown".into());
    (StatusCode::OK, format!("Sign-in failed: {code}"))
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
