//! Client-side shared state for the avaxslap UI.
//!
//! This crate owns the observable cells the UI reads and writes: wallet and
//! account snapshots, theme, chat history, and betting state. It has no
//! knowledge of the auth server; the two only meet in the browser.
//!
//! Ownership is explicit: build one [`AppStores`] at the app root and pass
//! it (or clones of individual cells) down. Subscriptions end when their
//! [`Subscription`] handle is dropped.

pub mod registry;
pub mod writable;

pub use registry::{AppStores, CHAT_HISTORY_LIMIT, ChatMessage, ThemeMode, ThemeState};
pub use writable::{Subscription, Writable};
