//! The application's catalog of UI state cells.
//!
//! Each field is an independent [`Writable`]; no cell reads another. Wallet
//! SDK payloads (account, network, app-kit, wallet info) are opaque JSON
//! because their shape belongs to the wallet library, not to us.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::writable::Writable;

/// Chat history keeps only the most recent messages.
pub const CHAT_HISTORY_LIMIT: usize = 50;
pub const DEFAULT_MAX_BET_AMOUNT: f64 = 1000.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeState {
    pub theme_mode: ThemeMode,
    pub theme_variables: Map<String, Value>,
}

/// A single chat message.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub user_name: String,
    pub content: String,
    pub timestamp: f64,
}

/// Append `item` and drop the oldest entries beyond `limit`.
pub fn push_bounded<T>(items: &mut Vec<T>, item: T, limit: usize) {
    items.push(item);
    if items.len() > limit {
        let overflow = items.len() - limit;
        items.drain(..overflow);
    }
}

/// Every shared UI cell, owned by whoever creates the app shell and passed
/// down by reference.
#[derive(Clone, Debug)]
pub struct AppStores {
    pub account_state: Writable<Value>,
    pub network_state: Writable<Value>,
    pub app_kit_state: Writable<Value>,
    pub theme_state: Writable<ThemeState>,
    pub events: Writable<Vec<Value>>,
    pub wallet_info: Writable<Value>,
    pub wagmi_config: Writable<Option<Value>>,
    pub signer_address: Writable<Option<String>>,
    pub connected: Writable<bool>,
    pub public_client: Writable<bool>,
    pub wallet_connected: Writable<bool>,
    pub is_admin: Writable<bool>,

    pub chat_messages: Writable<Vec<ChatMessage>>,
    pub recent_slaps: Writable<Vec<Value>>,
    pub pending_slaps: Writable<Vec<Value>>,
    pub bet_amount: Writable<f64>,
    pub max_bet_amount: Writable<f64>,
}

impl Default for AppStores {
    fn default() -> Self {
        Self::new()
    }
}

impl AppStores {
    #[must_use]
    pub fn new() -> Self {
        let empty_object = || Writable::new(Value::Object(Map::new()));
        Self {
            account_state: empty_object(),
            network_state: empty_object(),
            app_kit_state: empty_object(),
            theme_state: Writable::new(ThemeState::default()),
            events: Writable::new(Vec::new()),
            wallet_info: empty_object(),
            wagmi_config: Writable::new(None),
            signer_address: Writable::new(None),
            connected: Writable::new(false),
            public_client: Writable::new(false),
            wallet_connected: Writable::new(false),
            is_admin: Writable::new(false),
            chat_messages: Writable::new(Vec::new()),
            recent_slaps: Writable::new(Vec::new()),
            pending_slaps: Writable::new(Vec::new()),
            bet_amount: Writable::new(0.0),
            max_bet_amount: Writable::new(DEFAULT_MAX_BET_AMOUNT),
        }
    }

    /// Append to chat history, keeping the last [`CHAT_HISTORY_LIMIT`].
    pub fn send_message(&self, message: ChatMessage) {
        self.chat_messages
            .update(|messages| push_bounded(messages, message, CHAT_HISTORY_LIMIT));
    }
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;
