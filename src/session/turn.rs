//! Turns and the transcript

use serde::{Deserialize, Serialize};

/// Conversational role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The user asking
    Seeker,
    /// The model answering
    Guide,
}

/// One role-tagged message. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Turn {
    role: Role,
    content: String,
}

impl Turn {
    pub fn seeker(content: impl Into<String>) -> Self {
        Self {
            role: Role::Seeker,
            content: content.into(),
        }
    }

    pub fn guide(content: impl Into<String>) -> Self {
        Self {
            role: Role::Guide,
            content: content.into(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Append-only history of a session's turns
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub(super) fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// The last `limit` turns, oldest first
    pub fn recent(&self, limit: usize) -> &[Turn] {
        let start = self.turns.len().saturating_sub(limit);
        &self.turns[start..]
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    #[allow(dead_code)] // Pairs with len() for clippy::len_without_is_empty
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
