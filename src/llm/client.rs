//! LlmClient trait and a scriptable mock

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{Result, RoutrError};
use crate::llm::types::{CompletionRequest, CompletionResponse};

/// Stateless LLM client - each call is independent
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Single completion request (blocking until complete)
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Model identifier used when the request does not override it
    fn model(&self) -> &str;

    /// Whether the client has what it needs to make calls
    fn is_ready(&self) -> bool;
}

/// Mock client that replays queued responses and records requests
#[derive(Default)]
pub struct MockLlmClient {
    responses: Mutex<VecDeque<CompletionResponse>>,
    requests: Mutex<Vec<CompletionRequest>>,
    failure: Option<String>,
}

impl MockLlmClient {
    pub fn new(responses: Vec<CompletionResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            ..Default::default()
        }
    }

    /// Mock that answers every call with the same text
    pub fn replying(text: &str) -> Self {
        Self::new(vec![CompletionResponse::text(text)])
    }

    /// Mock whose every call fails with an LLM error
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Default::default()
        }
    }

    /// Requests received so far, oldest first
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }

        if let Some(message) = &self.failure {
            return Err(RoutrError::Llm(message.clone()));
        }

        let mut responses = self
            .responses
            .lock()
            .map_err(|_| RoutrError::Llm("mock response queue poisoned".to_string()))?;

        // The last queued response repeats once the queue drains
        match responses.len() {
            0 => Err(RoutrError::Llm("mock has no responses queued".to_string())),
            1 => Ok(responses[0].clone()),
            _ => Ok(responses.pop_front().unwrap_or_default()),
        }
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    fn is_ready(&self) -> bool {
        true
    }
}
