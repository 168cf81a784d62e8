//! Token and session enrichment.
//!
//! DESIGN
//! ======
//! The OAuth handlers call two hooks at fixed points: `on_token` whenever a
//! token is issued or re-read, and `on_session` whenever a session view is
//! built for a client. Both are pure transforms over typed records, so the
//! handlers never poke at optional fields directly.
//!
//! Enrichment is annotation only. Missing profile or user data is a normal
//! case and leaves the input untouched; neither hook can fail.

use serde::{Deserialize, Serialize};

/// Application-shaped identity mapped from a provider profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: String,
    pub name: String,
    pub username: String,
    pub image: Option<String>,
}

/// Server-side credential bundle, stored in an encrypted cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Provider id, e.g. `"twitter"`.
    pub provider: String,
    /// Provider account id.
    pub sub: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Access token expiry, unix seconds.
    #[serde(default)]
    pub expires_at: Option<i64>,
    /// Issued-at, unix seconds.
    pub iat: i64,
}

/// User section of a materialized session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub name: Option<String>,
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// Per-request session view. Recomputed from the token on every read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<SessionUser>,
    /// RFC 3339 expiry of the session cookie.
    pub expires: String,
}

impl Session {
    /// Skeleton built from the token before `on_session` runs.
    #[must_use]
    pub fn from_token(token: &Token, expires: String) -> Self {
        Self {
            user: Some(SessionUser { name: token.name.clone(), image: token.picture.clone(), username: None }),
            expires,
        }
    }
}

/// Extension points invoked by the auth handlers.
pub trait AuthCallbacks: Send + Sync {
    /// Runs on first issuance (`profile` present) and on every later read
    /// (`profile` absent).
    fn on_token(&self, token: Token, profile: Option<&UserIdentity>) -> Token;

    /// Runs each time a session is returned to a client.
    fn on_session(&self, session: Session, token: &Token) -> Session;
}

/// Copies the provider `username` through token and session.
#[derive(Debug, Clone, Copy, Default)]
pub struct UsernameEnrichment;

impl AuthCallbacks for UsernameEnrichment {
    fn on_token(&self, mut token: Token, profile: Option<&UserIdentity>) -> Token {
        if let Some(profile) = profile {
            token.username = Some(profile.username.clone());
        }
        token
    }

    fn on_session(&self, mut session: Session, token: &Token) -> Session {
        if let Some(user) = session.user.as_mut() {
            user.username.clone_from(&token.username);
        }
        session
    }
}

#[cfg(test)]
#[path = "callbacks_test.rs"]
mod tests;
