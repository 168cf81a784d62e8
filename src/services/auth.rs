//! Twitter OAuth2 service — configuration, code exchange, profile fetch.
//!
//! The authorization request is a standard Authorization Code flow with PKCE.
//! Twitter treats us as a confidential client, so the token request carries
//! both the PKCE verifier and HTTP basic credentials.

use axum_extra::extract::cookie::Key;
use reqwest::Url;
use serde::Deserialize;
use sha2::{Digest, Sha512};

use super::callbacks::{Token, UserIdentity};
use super::pkce::{CODE_CHALLENGE_METHOD, PkceVerifier};

pub const PROVIDER_ID: &str = "twitter";
pub const AUTHORIZATION_URL: &str = "https://twitter.com/i/oauth2/authorize";
pub const TOKEN_URL: &str = "https://api.twitter.com/2/oauth2/token";
pub const USERINFO_URL: &str = "https://api.twitter.com/2/users/me?user.fields=profile_image_url";
pub const SCOPES: &str = "users.read tweet.read offline.access";

/// Route paths owned by the auth flow.
pub mod pages {
    pub const SIGN_IN: &str = "/auth/signin";
    pub const CALLBACK: &str = "/auth/callback/twitter";
    pub const SESSION: &str = "/auth/session";
    pub const SIGN_OUT: &str = "/auth/signout";
    pub const ERROR: &str = "/auth/error";
}

// =============================================================================
// CONFIG
// =============================================================================

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {var}")]
    Missing { var: &'static str },
    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Twitter client registration plus the endpoints we talk to.
#[derive(Debug, Clone)]
pub struct TwitterConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub authorization_url: String,
    pub token_url: String,
    pub userinfo_url: String,
}

impl TwitterConfig {
    #[must_use]
    pub fn new(client_id: String, client_secret: String, redirect_uri: String) -> Self {
        Self {
            client_id,
            client_secret,
            redirect_uri,
            authorization_url: AUTHORIZATION_URL.into(),
            token_url: TOKEN_URL.into(),
            userinfo_url: USERINFO_URL.into(),
        }
    }

    /// Build the provider authorization URL for one sign-in attempt.
    ///
    /// # Errors
    ///
    /// Returns an error if `authorization_url` is not a valid URL.
    pub fn authorize_url(&self, state: &str, verifier: &PkceVerifier) -> Result<Url, ConfigError> {
        let challenge = verifier.challenge();
        Url::parse_with_params(
            &self.authorization_url,
            &[
                ("response_type", "code"),
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("scope", SCOPES),
                ("state", state),
                ("code_challenge", challenge.as_str()),
                ("code_challenge_method", CODE_CHALLENGE_METHOD),
            ],
        )
        .map_err(|e| ConfigError::Invalid { var: "authorization_url", reason: e.to_string() })
    }
}

/// Everything the auth flow needs at startup. All fields are required.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub twitter: TwitterConfig,
    /// Signing secret used to derive the cookie encryption key.
    pub secret: String,
}

impl AuthConfig {
    /// Load from `TWITTER_CLIENT_ID`, `TWITTER_CLIENT_SECRET`, `AUTH_SECRET`,
    /// `PUBLIC_TWITTER_REDIRECT_URI`.
    ///
    /// # Errors
    ///
    /// Returns the first missing or blank variable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`AuthConfig::from_env`] with an injectable variable source.
    ///
    /// # Errors
    ///
    /// Returns the first missing or blank variable, or a redirect URI that
    /// does not parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |var: &'static str| {
            lookup(var)
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing { var })
        };

        let client_id = required("TWITTER_CLIENT_ID")?;
        let client_secret = required("TWITTER_CLIENT_SECRET")?;
        let secret = required("AUTH_SECRET")?;
        let redirect_uri = required("PUBLIC_TWITTER_REDIRECT_URI")?;
        Url::parse(&redirect_uri)
            .map_err(|e| ConfigError::Invalid { var: "PUBLIC_TWITTER_REDIRECT_URI", reason: e.to_string() })?;

        Ok(Self { twitter: TwitterConfig::new(client_id, client_secret, redirect_uri), secret })
    }

    /// Cookie encryption key. SHA-512 stretches any secret to the 64 bytes
    /// `Key::from` requires.
    #[must_use]
    pub fn cookie_key(&self) -> Key {
        let digest = Sha512::digest(self.secret.as_bytes());
        Key::from(digest.as_slice())
    }
}

// =============================================================================
// PROVIDER API
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("twitter token exchange failed: {0}")]
    TokenExchange(String),
    #[error("twitter api error: {0}")]
    ProviderApi(String),
}

/// Token endpoint response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Lifetime in seconds.
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub scope: Option<String>,
}

/// Raw account attributes from `GET /2/users/me`.
#[derive(Debug, Clone, Deserialize)]
pub struct TwitterProfile {
    pub id: String,
    pub name: String,
    pub username: String,
    #[serde(default)]
    pub profile_image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserEnvelope {
    data: TwitterProfile,
}

impl From<&TwitterProfile> for UserIdentity {
    fn from(profile: &TwitterProfile) -> Self {
        Self {
            id: profile.id.clone(),
            name: profile.name.clone(),
            username: profile.username.clone(),
            image: profile.profile_image_url.clone(),
        }
    }
}

/// Exchange an authorization code (plus PKCE verifier) for tokens.
pub async fn exchange_code(config: &TwitterConfig, code: &str, verifier: &PkceVerifier) -> Result<TokenGrant, AuthError> {
    let client = reqwest::Client::new();
    let resp = client
        .post(&config.token_url)
        .basic_auth(&config.client_id, Some(&config.client_secret))
        .header("Accept", "application/json")
        .form(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", config.redirect_uri.as_str()),
            ("client_id", config.client_id.as_str()),
            ("code_verifier", verifier.as_str()),
        ])
        .send()
        .await
        .map_err(|e| AuthError::TokenExchange(e.to_string()))?;

    let status = resp.status();
    let body = resp
        .text()
        .await
        .map_err(|e| AuthError::TokenExchange(e.to_string()))?;
    if !status.is_success() {
        return Err(AuthError::TokenExchange(format!("{status}: {body}")));
    }
    serde_json::from_str(&body).map_err(|_| AuthError::TokenExchange(format!("unexpected response: {body}")))
}

/// Fetch the authenticated account's profile.
pub async fn fetch_twitter_profile(config: &TwitterConfig, access_token: &str) -> Result<TwitterProfile, AuthError> {
    let client = reqwest::Client::new();
    let resp = client
        .get(&config.userinfo_url)
        .bearer_auth(access_token)
        .header("User-Agent", "avaxslap")
        .send()
        .await
        .map_err(|e| AuthError::ProviderApi(e.to_string()))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(AuthError::ProviderApi(format!("{status}: {body}")));
    }

    resp.json::<UserEnvelope>()
        .await
        .map(|envelope| envelope.data)
        .map_err(|e| AuthError::ProviderApi(e.to_string()))
}

/// Initial token for a fresh sign-in, before `on_token` runs.
#[must_use]
pub fn build_token(identity: &UserIdentity, grant: TokenGrant, now: i64) -> Token {
    Token {
        provider: PROVIDER_ID.into(),
        sub: identity.id.clone(),
        name: Some(identity.name.clone()),
        picture: identity.image.clone(),
        username: None,
        access_token: grant.access_token,
        refresh_token: grant.refresh_token,
        expires_at: grant.expires_in.map(|secs| now + secs),
        iat: now,
    }
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
