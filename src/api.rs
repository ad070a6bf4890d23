//! HTTP API for the guide
//!
//! One handler call per user interaction; all conversation state lives in
//! the session store.

mod assets;
mod handlers;
mod types;

pub use handlers::create_router;

use crate::config::GuideConfig;
use crate::llm::{ConnectionSettings, LlmConnector};
use crate::session::SessionStore;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionStore>,
    pub connector: Arc<dyn LlmConnector>,
    pub settings: Arc<ConnectionSettings>,
    pub max_messages_displayed: usize,
}

impl AppState {
    pub fn new(connector: Arc<dyn LlmConnector>, config: &GuideConfig) -> Self {
        Self {
            sessions: Arc::new(SessionStore::new()),
            connector,
            settings: Arc::new(config.connection_settings()),
            max_messages_displayed: config.max_messages_displayed,
        }
    }
}
