//! Conversation sessions
//!
//! A session owns its transcript and its connection to the backend. The
//! connection is opened at most once; a failed attempt leaves the session
//! permanently unable to submit. Every accepted submission adds exactly one
//! seeker turn followed by exactly one guide turn.

mod connection;
mod error;
mod store;
mod turn;

#[cfg(test)]
mod proptests;
#[cfg(test)]
pub mod testing;

pub use connection::{ConnectionHandle, ConnectionState};
pub use error::{GuideReply, InitError, SessionError};
pub use store::{SessionStore, SharedSession};
pub use turn::{Role, Transcript, Turn};

use crate::llm::{ConnectionSettings, LlmConnector};
use chrono::{DateTime, Utc};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Explicit session context passed to every chat operation
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    created_at: DateTime<Utc>,
    last_active: Instant,
    transcript: Transcript,
    connection: ConnectionState,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            last_active: Instant::now(),
            transcript: Transcript::default(),
            connection: ConnectionState::Uninitialized,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Mark the session as in use
    pub fn touch(&mut self) {
        self.last_active = Instant::now();
    }

    /// No activity for longer than `ttl` as of `now`
    pub fn is_idle(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.last_active) > ttl
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn connection(&self) -> &ConnectionState {
        &self.connection
    }

    /// Open the backend connection unless this session already tried.
    ///
    /// Later calls return the outcome of the first attempt without calling
    /// `connector` again.
    pub async fn initialize(
        &mut self,
        connector: &dyn LlmConnector,
        settings: &ConnectionSettings,
    ) -> Result<(), InitError> {
        match &self.connection {
            ConnectionState::Ready(_) => return Ok(()),
            ConnectionState::Unavailable(err) => return Err(err.clone()),
            ConnectionState::Uninitialized => {}
        }

        match connector.connect(settings).await {
            Ok(service) => {
                tracing::info!(session = %self.id, model = %service.model_id(), "Session connected");
                self.connection =
                    ConnectionState::Ready(ConnectionHandle::new(service, settings.clone()));
                Ok(())
            }
            Err(e) => {
                let err = InitError::from(e);
                match &err {
                    InitError::ConnectionUnavailable { detail } => {
                        tracing::warn!(session = %self.id, error = %detail, "Model backend unreachable");
                    }
                    InitError::InitializationError(detail) => {
                        tracing::error!(session = %self.id, error = %detail, "Session initialization failed");
                    }
                }
                self.connection = ConnectionState::Unavailable(err.clone());
                Err(err)
            }
        }
    }

    /// Relay one seeker message to the guide.
    ///
    /// The seeker turn is recorded before the backend is called, so a failed
    /// call still leaves both turns in the transcript.
    pub async fn submit(&mut self, text: &str) -> Result<GuideReply, SessionError> {
        self.touch();
        if text.trim().is_empty() {
            return Err(SessionError::EmptyInput);
        }
        let ConnectionState::Ready(handle) = &mut self.connection else {
            tracing::warn!(session = %self.id, "Submission without a connection");
            return Err(SessionError::SessionUnavailable);
        };

        self.transcript.push(Turn::seeker(text));
        let reply = handle.converse(text).await;
        self.transcript.push(Turn::guide(reply.content()));

        if let GuideReply::Failed(failure) = &reply {
            tracing::warn!(session = %self.id, error = %failure.detail, "Generation failed");
        } else {
            tracing::debug!(session = %self.id, turns = self.transcript.len(), "Guide replied");
        }
        Ok(reply)
    }
}
