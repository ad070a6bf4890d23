//! Runtime configuration
//!
//! Defaults mirror the deployed guide: `deepseek-r1:7b` on a local Ollama.
//! Each value can be overridden through the environment.

use crate::llm::ConnectionSettings;
use crate::prompt::{STOP_SEQUENCES, SYSTEM_PROMPT};
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "deepseek-r1:7b";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 2000;
pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_MAX_MESSAGES_DISPLAYED: usize = 50;
pub const DEFAULT_PORT: u16 = 8501;
pub const DEFAULT_SESSION_TTL_SECS: u64 = 3600;
const MAX_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq)]
pub struct GuideConfig {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub ollama_base_url: String,
    pub request_timeout: Duration,
    /// Size of the transcript window shown when a page reloads
    pub max_messages_displayed: usize,
    pub port: u16,
    /// Sessions idle longer than this are dropped
    pub session_ttl: Duration,
}

impl Default for GuideConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            ollama_base_url: DEFAULT_OLLAMA_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            max_messages_displayed: DEFAULT_MAX_MESSAGES_DISPLAYED,
            port: DEFAULT_PORT,
            session_ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
        }
    }
}

impl GuideConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            model: lookup("GITA_MODEL")
                .filter(|m| !m.trim().is_empty())
                .unwrap_or(defaults.model),
            temperature: parse_or(&lookup, "GITA_TEMPERATURE", defaults.temperature),
            max_tokens: parse_or(&lookup, "GITA_MAX_TOKENS", defaults.max_tokens),
            ollama_base_url: lookup("OLLAMA_BASE_URL")
                .filter(|u| !u.trim().is_empty())
                .unwrap_or(defaults.ollama_base_url),
            request_timeout: Duration::from_secs(parse_or(
                &lookup,
                "GITA_REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )),
            max_messages_displayed: parse_or(
                &lookup,
                "GITA_MAX_MESSAGES",
                defaults.max_messages_displayed,
            ),
            port: parse_or(&lookup, "GITA_PORT", defaults.port),
            session_ttl: Duration::from_secs(
                parse_or(&lookup, "GITA_SESSION_TTL_SECS", DEFAULT_SESSION_TTL_SECS).max(1),
            ),
        }
    }

    /// How often idle sessions are swept
    pub fn sweep_interval(&self) -> Duration {
        self.session_ttl.min(MAX_SWEEP_INTERVAL)
    }

    /// Settings every session connects with
    pub fn connection_settings(&self) -> ConnectionSettings {
        ConnectionSettings {
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            base_url: self.ollama_base_url.clone(),
            system_prompt: SYSTEM_PROMPT.to_string(),
            stop: STOP_SEQUENCES.iter().map(ToString::to_string).collect(),
            request_timeout: self.request_timeout,
        }
    }
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    let Some(raw) = lookup(key) else {
        return default;
    };
    if let Ok(value) = raw.trim().parse::<T>() {
        value
    } else {
        tracing::warn!(key, value = %raw, "Ignoring unparseable configuration value");
        default
    }
}
