//! Mock implementations for testing
//!
//! These mocks enable session and API testing without a running backend.

use crate::llm::{
    ConnectionSettings, LlmConnector, LlmError, LlmRequest, LlmResponse, LlmService,
};
use crate::prompt::{STOP_SEQUENCES, SYSTEM_PROMPT};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub fn test_settings() -> ConnectionSettings {
    ConnectionSettings {
        model: "deepseek-r1:7b".to_string(),
        temperature: 0.7,
        max_tokens: 2000,
        base_url: "http://localhost:11434".to_string(),
        system_prompt: SYSTEM_PROMPT.to_string(),
        stop: STOP_SEQUENCES.iter().map(ToString::to_string).collect(),
        request_timeout: Duration::from_secs(5),
    }
}

// ============================================================================
// Mock LLM Service
// ============================================================================

/// Mock LLM service that returns queued responses
pub struct MockLlmService {
    responses: Mutex<VecDeque<Result<LlmResponse, LlmError>>>,
    model_id: String,
    /// Record of all requests made
    pub requests: Mutex<Vec<LlmRequest>>,
}

impl MockLlmService {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            model_id: model_id.into(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful response
    pub fn queue_response(&self, response: LlmResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    /// Queue an error response
    pub fn queue_error(&self, error: LlmError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Get recorded requests
    pub fn recorded_requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmService for MockLlmService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::network("No mock response queued")))
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

// ============================================================================
// Mock Connector
// ============================================================================

/// Mock connector handing out a fixed service or a fixed error
pub struct MockConnector {
    outcome: Result<Arc<MockLlmService>, LlmError>,
    calls: AtomicUsize,
}

impl MockConnector {
    pub fn ready(service: Arc<MockLlmService>) -> Self {
        Self {
            outcome: Ok(service),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(error: LlmError) -> Self {
        Self {
            outcome: Err(error),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn connect_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmConnector for MockConnector {
    async fn connect(
        &self,
        _settings: &ConnectionSettings,
    ) -> Result<Arc<dyn LlmService>, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            Ok(service) => Ok(service.clone() as Arc<dyn LlmService>),
            Err(e) => Err(e.clone()),
        }
    }
}
