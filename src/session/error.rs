//! Session error types
//!
//! Every variant's display text is what the user sees.

use crate::llm::LlmError;
use thiserror::Error;

/// Why a session has no connection to the backend
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InitError {
    /// Backend unreachable
    #[error("❌ Could not connect to Ollama. Please ensure Ollama is running locally.")]
    ConnectionUnavailable { detail: String },
    /// Any other setup failure
    #[error("❌ An error occurred: {0}")]
    InitializationError(String),
}

impl From<LlmError> for InitError {
    fn from(e: LlmError) -> Self {
        if e.is_unreachable() {
            Self::ConnectionUnavailable { detail: e.message }
        } else {
            Self::InitializationError(e.message)
        }
    }
}

/// Submission rejected before anything was recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Cannot process request - Connection not established")]
    SessionUnavailable,
    #[error("Message must not be empty")]
    EmptyInput,
}

/// The completion call failed after the seeker turn was recorded
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("❌ Failed to generate response: {detail}")]
pub struct GenerationFailure {
    pub detail: String,
}

/// Outcome of one submission, shared by the transcript and the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuideReply {
    /// Raw model output
    Answer(String),
    Failed(GenerationFailure),
}

impl GuideReply {
    /// Text stored as the guide turn
    pub fn content(&self) -> String {
        match self {
            GuideReply::Answer(text) => text.clone(),
            GuideReply::Failed(failure) => failure.to_string(),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, GuideReply::Failed(_))
    }
}
