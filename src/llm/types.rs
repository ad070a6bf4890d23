//! Common types for LLM interactions

use std::time::Duration;

/// Everything needed to open a connection to the model backend.
///
/// Fixed for the lifetime of a session once the connection is established.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionSettings {
    /// Backend model name (e.g., "deepseek-r1:7b")
    pub model: String,
    pub temperature: f32,
    /// Upper bound on generated tokens
    pub max_tokens: u32,
    /// Base address of the backend (e.g., `http://localhost:11434`)
    pub base_url: String,
    pub system_prompt: String,
    pub stop: Vec<String>,
    pub request_timeout: Duration,
}

impl ConnectionSettings {
    pub fn generation_options(&self) -> GenerationOptions {
        GenerationOptions {
            temperature: self.temperature,
            max_tokens: Some(self.max_tokens),
            stop: self.stop.clone(),
        }
    }
}

/// Sampling parameters sent with every request
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOptions {
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    pub stop: Vec<String>,
}

/// LLM request
#[derive(Debug, Clone)]
pub struct LlmRequest {
    pub system: String,
    /// Full conversation text, ending with the new input
    pub prompt: String,
    pub options: GenerationOptions,
}

/// LLM response
#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub text: String,
    pub usage: Usage,
}

impl LlmResponse {
    #[cfg(test)]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            usage: Usage::default(),
        }
    }
}

/// Usage statistics
#[derive(Debug, Clone, Default)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}
