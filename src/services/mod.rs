//! Auth services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own provider calls and token shaping so route handlers
//! can stay focused on cookies, redirects, and status codes.

pub mod auth;
pub mod callbacks;
pub mod pkce;
