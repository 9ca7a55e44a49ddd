use std::sync::Mutex;

use crate::config::InferenceConfig;

use super::prompt::ChatRequest;
use super::{preview, InferenceError};

/// Text-inference collaborator (allows mocking).
///
/// Returns the raw response body; envelope validation happens in the parser
/// so that each contract violation surfaces as its own error.
pub trait InferenceClient {
    fn complete(&self, request: &ChatRequest) -> Result<String, InferenceError>;
}

/// Blocking client for an OpenAI-compatible `/chat/completions` endpoint.
pub struct ChatCompletionClient {
    endpoint: String,
    api_key: Option<String>,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl ChatCompletionClient {
    pub fn new(config: &InferenceConfig) -> Result<Self, InferenceError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| InferenceError::Transport(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key: config.api_key.clone(),
            client,
            timeout_secs: config.timeout.as_secs(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl InferenceClient for ChatCompletionClient {
    fn complete(&self, request: &ChatRequest) -> Result<String, InferenceError> {
        let mut builder = self.client.post(&self.endpoint).json(request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().map_err(|e| {
            if e.is_connect() {
                InferenceError::Transport(format!("Inference service not reachable at {}", self.endpoint))
            } else if e.is_timeout() {
                InferenceError::Transport(format!("Request timed out after {}s", self.timeout_secs))
            } else {
                InferenceError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| InferenceError::Transport(format!("Failed to read response body: {e}")))?;

        if !status.is_success() {
            return Err(InferenceError::Transport(format!(
                "Inference service returned status {}: {}",
                status.as_u16(),
                preview(&body)
            )));
        }

        Ok(body)
    }
}

/// Mock inference client for testing. Returns a configurable body or
/// transport failure, and records the last request it received.
pub struct MockInferenceClient {
    outcome: Result<String, InferenceError>,
    last_request: Mutex<Option<ChatRequest>>,
    calls: Mutex<usize>,
}

impl MockInferenceClient {
    /// Respond with `body` verbatim as the response envelope.
    pub fn new(body: &str) -> Self {
        Self {
            outcome: Ok(body.to_string()),
            last_request: Mutex::new(None),
            calls: Mutex::new(0),
        }
    }

    /// Respond with a chat envelope whose message content is `content`.
    pub fn with_content(content: &str) -> Self {
        let envelope = serde_json::json!({
            "choices": [{ "index": 0, "message": { "role": "assistant", "content": content } }]
        });
        Self::new(&envelope.to_string())
    }

    pub fn failing(message: &str) -> Self {
        Self {
            outcome: Err(InferenceError::Transport(message.to_string())),
            last_request: Mutex::new(None),
            calls: Mutex::new(0),
        }
    }

    pub fn last_request(&self) -> Option<ChatRequest> {
        self.last_request.lock().ok().and_then(|guard| guard.clone())
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|guard| *guard).unwrap_or(0)
    }
}

impl InferenceClient for MockInferenceClient {
    fn complete(&self, request: &ChatRequest) -> Result<String, InferenceError> {
        if let Ok(mut guard) = self.last_request.lock() {
            *guard = Some(request.clone());
        }
        if let Ok(mut calls) = self.calls.lock() {
            *calls += 1;
        }
        self.outcome.clone()
    }
}
