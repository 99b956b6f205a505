pub mod admin;
pub mod command;
pub mod config;
pub mod gateway;
pub mod state_machine;
pub mod webhook;

use std::sync::Arc;

use stationmaster_core::ContentTables;

pub use gateway::{ChatId, HttpMessenger, Messenger, RecordingMessenger, TextFormat};
pub use state_machine::{Event, HuntMachineState, SessionStore};

/// Shared application state behind the axum router.
pub struct AppState {
    pub store: SessionStore,
    pub messenger: Arc<dyn Messenger>,
    pub admin_chat: ChatId,
    pub gateway_webhook_secret: String,
}

impl AppState {
    pub fn new(
        tables: Arc<ContentTables>,
        messenger: Arc<dyn Messenger>,
        admin_chat: ChatId,
        gateway_webhook_secret: String,
    ) -> Self {
        Self {
            store: SessionStore::new(tables),
            messenger,
            admin_chat,
            gateway_webhook_secret,
        }
    }
}
