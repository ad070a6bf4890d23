//! Connection handle and conversation memory

use super::error::{GenerationFailure, GuideReply, InitError};
use crate::llm::{ConnectionSettings, LlmRequest, LlmService};
use crate::prompt::conversation_prompt;
use std::fmt;
use std::sync::Arc;

/// One completed exchange remembered for future prompts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    pub seeker: String,
    pub guide: String,
}

/// Successful exchanges, replayed in front of every new input.
///
/// Failed exchanges never enter memory.
#[derive(Debug, Clone, Default)]
pub struct ConversationMemory {
    exchanges: Vec<Exchange>,
}

impl ConversationMemory {
    pub fn record(&mut self, seeker: impl Into<String>, guide: impl Into<String>) {
        self.exchanges.push(Exchange {
            seeker: seeker.into(),
            guide: guide.into(),
        });
    }

    #[cfg(test)]
    pub fn exchanges(&self) -> &[Exchange] {
        &self.exchanges
    }

    pub fn prompt_for(&self, input: &str) -> String {
        conversation_prompt(
            self.exchanges
                .iter()
                .map(|e| (e.seeker.as_str(), e.guide.as_str())),
            input,
        )
    }
}

/// Live link to the backend plus its fixed generation parameters
pub struct ConnectionHandle {
    service: Arc<dyn LlmService>,
    settings: ConnectionSettings,
    memory: ConversationMemory,
}

impl ConnectionHandle {
    pub fn new(service: Arc<dyn LlmService>, settings: ConnectionSettings) -> Self {
        Self {
            service,
            settings,
            memory: ConversationMemory::default(),
        }
    }

    #[cfg(test)]
    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    fn request_for(&self, input: &str) -> LlmRequest {
        LlmRequest {
            system: self.settings.system_prompt.clone(),
            prompt: self.memory.prompt_for(input),
            options: self.settings.generation_options(),
        }
    }

    /// Issue exactly one completion request for `input`.
    pub async fn converse(&mut self, input: &str) -> GuideReply {
        let request = self.request_for(input);

        match self.service.complete(&request).await {
            Ok(response) => {
                self.memory.record(input, response.text.as_str());
                GuideReply::Answer(response.text)
            }
            Err(e) => GuideReply::Failed(GenerationFailure { detail: e.message }),
        }
    }
}

impl fmt::Debug for ConnectionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionHandle")
            .field("model", &self.service.model_id())
            .field("base_url", &self.settings.base_url)
            .field("remembered", &self.memory.exchanges.len())
            .finish_non_exhaustive()
    }
}

/// Per-session connection lifecycle. `Unavailable` is sticky.
#[derive(Debug, Default)]
pub enum ConnectionState {
    #[default]
    Uninitialized,
    Ready(ConnectionHandle),
    Unavailable(InitError),
}

impl ConnectionState {
    pub fn is_ready(&self) -> bool {
        matches!(self, ConnectionState::Ready(_))
    }

    pub fn error(&self) -> Option<&InitError> {
        match self {
            ConnectionState::Unavailable(err) => Some(err),
            _ => None,
        }
    }
}
