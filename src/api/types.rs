//! API request and response types

use crate::render::RenderedTurn;
use crate::session::ConnectionState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request to send a chat message
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub text: String,
}

/// Whether the session can talk to the backend
#[derive(Debug, Serialize)]
pub struct ConnectionStatus {
    pub ready: bool,
    /// Banner text when the connection could not be established
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&ConnectionState> for ConnectionStatus {
    fn from(state: &ConnectionState) -> Self {
        Self {
            ready: state.is_ready(),
            error: state.error().map(ToString::to_string),
        }
    }
}

/// Response with a session and its recent turns
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub connection: ConnectionStatus,
    pub messages: Vec<RenderedTurn>,
    /// Turns in the transcript, including any outside `messages`
    pub total_messages: usize,
}

/// Response for one submission
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub seeker: RenderedTurn,
    pub guide: RenderedTurn,
    /// The guide turn is a generation failure
    pub failed: bool,
}

/// Response for lifecycle actions
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
