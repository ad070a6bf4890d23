//! Ollama provider implementation
//!
//! Talks to a local Ollama server through its non-streaming
//! `/api/generate` endpoint. `/api/tags` doubles as the reachability probe
//! used when a session opens its connection.

use super::types::{ConnectionSettings, LlmRequest, LlmResponse, Usage};
use super::{LlmConnector, LlmError, LlmService, LoggingService};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Ollama service implementation
pub struct OllamaService {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaService {
    /// Build a client for `settings`. Does not touch the network.
    pub fn new(settings: &ConnectionSettings) -> Result<Self, LlmError> {
        let url = Url::parse(&settings.base_url).map_err(|e| {
            LlmError::invalid_request(format!("Invalid base URL '{}': {e}", settings.base_url))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(LlmError::invalid_request(format!(
                "Unsupported scheme '{}' in base URL '{}'",
                url.scheme(),
                settings.base_url
            )));
        }

        let client = Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(|e| LlmError::unknown(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    /// Names of the models the server has pulled
    pub async fn list_models(&self) -> Result<Vec<String>, LlmError> {
        let response = self
            .client
            .get(self.endpoint("api/tags"))
            .send()
            .await
            .map_err(classify_send_error)?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LlmError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(classify_status(status, &body));
        }

        let tags: OllamaTagsResponse = serde_json::from_str(&body).map_err(|e| {
            LlmError::unknown(format!("Failed to parse model list: {e} - body: {body}"))
        })?;

        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    fn translate_request(&self, request: &LlmRequest) -> OllamaGenerateRequest {
        OllamaGenerateRequest {
            model: self.model.clone(),
            prompt: request.prompt.clone(),
            system: request.system.clone(),
            stream: false,
            options: OllamaOptions {
                temperature: request.options.temperature,
                num_predict: request.options.max_tokens,
                stop: request.options.stop.clone(),
            },
        }
    }

    fn normalize_response(resp: OllamaGenerateResponse) -> Result<LlmResponse, LlmError> {
        if let Some(error) = resp.error {
            return Err(LlmError::unknown(format!("Ollama error: {error}")));
        }

        Ok(LlmResponse {
            text: resp.response,
            usage: Usage {
                input_tokens: resp.prompt_eval_count.unwrap_or(0),
                output_tokens: resp.eval_count.unwrap_or(0),
            },
        })
    }
}

#[async_trait]
impl LlmService for OllamaService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let ollama_request = self.translate_request(request);

        let response = self
            .client
            .post(self.endpoint("api/generate"))
            .json(&ollama_request)
            .send()
            .await
            .map_err(classify_send_error)?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LlmError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(classify_status(status, &body));
        }

        let ollama_response: OllamaGenerateResponse = serde_json::from_str(&body).map_err(|e| {
            LlmError::unknown(format!("Failed to parse response: {e} - body: {body}"))
        })?;

        Self::normalize_response(ollama_response)
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

/// Connects sessions to an Ollama server
#[derive(Debug, Default, Clone, Copy)]
pub struct OllamaConnector;

#[async_trait]
impl LlmConnector for OllamaConnector {
    async fn connect(
        &self,
        settings: &ConnectionSettings,
    ) -> Result<Arc<dyn LlmService>, LlmError> {
        let service = OllamaService::new(settings)?;
        let models = service.list_models().await?;

        if !models.iter().any(|name| model_matches(name, &settings.model)) {
            tracing::warn!(
                model = %settings.model,
                available = ?models,
                "Configured model is not pulled on the Ollama server"
            );
        }

        tracing::info!(
            model = %settings.model,
            base_url = %settings.base_url,
            "Connected to Ollama"
        );
        Ok(Arc::new(LoggingService::new(Arc::new(service))))
    }
}

/// `llama3` is listed by Ollama as `llama3:latest`
fn model_matches(listed: &str, wanted: &str) -> bool {
    listed == wanted || listed.strip_suffix(":latest") == Some(wanted)
}

fn classify_send_error(e: reqwest::Error) -> LlmError {
    if e.is_timeout() {
        LlmError::network(format!("Request timeout: {e}"))
    } else if e.is_connect() {
        LlmError::network(format!("Connection failed: {e}"))
    } else {
        LlmError::unknown(format!("Request failed: {e}"))
    }
}

fn classify_status(status: reqwest::StatusCode, body: &str) -> LlmError {
    let Ok(error_resp) = serde_json::from_str::<OllamaErrorResponse>(body) else {
        return LlmError::unknown(format!("HTTP {status} error: {body}"));
    };
    let message = error_resp.error;
    match status.as_u16() {
        400 => LlmError::invalid_request(format!("Invalid request: {message}")),
        404 => LlmError::invalid_request(format!("Not found: {message}")),
        500..=599 => LlmError::server_error(format!("Server error: {message}")),
        _ => LlmError::unknown(format!("HTTP {status}: {message}")),
    }
}

// Ollama API types

#[derive(Debug, Serialize)]
struct OllamaGenerateRequest {
    model: String,
    prompt: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    system: String,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    stop: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct OllamaGenerateResponse {
    #[serde(default)]
    response: String,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    prompt_eval_count: Option<u64>,
    #[serde(default)]
    eval_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct OllamaTagsResponse {
    #[serde(default)]
    models: Vec<OllamaModelTag>,
}

#[derive(Debug, Deserialize)]
struct OllamaModelTag {
    name: String,
}

#[derive(Debug, Deserialize)]
struct OllamaErrorResponse {
    error: String,
}
