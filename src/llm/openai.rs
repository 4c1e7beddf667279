//! OpenAI-compatible chat-completions client
//!
//! Works against any endpoint that speaks `/chat/completions` (Together AI,
//! OpenAI, vLLM, Ollama). Retries belong here, not in the router.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use serde_json::{Value, json};

use crate::config::LlmConfig;
use crate::error::{Result, RoutrError};
use crate::llm::client::LlmClient;
use crate::llm::types::{CompletionRequest, CompletionResponse, Role, StopReason, Usage};

/// Base delay for exponential backoff between retries
const RETRY_BASE_DELAY: Duration = Duration::from_millis(500);

/// Upper bound on a server-requested retry delay
const MAX_RETRY_AFTER: Duration = Duration::from_secs(30);

/// Configuration for the chat-completions client
#[derive(Debug, Clone)]
pub struct OpenAiCompatConfig {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    pub timeout: Duration,
    pub max_retries: u32,
}

impl Default for OpenAiCompatConfig {
    fn default() -> Self {
        Self::from(&LlmConfig::default())
    }
}

impl From<&LlmConfig> for OpenAiCompatConfig {
    fn from(config: &LlmConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout: Duration::from_millis(config.timeout_ms),
            max_retries: config.max_retries,
        }
    }
}

/// Outcome of a single HTTP attempt
#[derive(Debug)]
enum AttemptError {
    Retryable { message: String, retry_after: Option<Duration> },
    Fatal(String),
}

/// Chat-completions client
pub struct OpenAiCompatClient {
    client: Client,
    api_key: String,
    config: OpenAiCompatConfig,
    usage: Arc<Mutex<Usage>>,
}

impl OpenAiCompatClient {
    /// Create a client reading the API key from the env var named in config
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .map_err(|_| RoutrError::Config(format!("{} not set", config.api_key_env)))?;

        Self::with_api_key(api_key, OpenAiCompatConfig::from(config))
    }

    /// Create a client with an explicit API key
    pub fn with_api_key(api_key: String, config: OpenAiCompatConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RoutrError::Llm(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            config,
            usage: Arc::new(Mutex::new(Usage::default())),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }

    /// Build the request body for the chat-completions API
    fn build_request(&self, request: &CompletionRequest) -> Value {
        let model = request.model.as_ref().unwrap_or(&self.config.model);
        let temperature = request.temperature.unwrap_or(self.config.temperature);

        let mut messages: Vec<Value> = Vec::with_capacity(request.messages.len() + 1);
        if !request.system.is_empty() {
            messages.push(json!({ "role": "system", "content": request.system }));
        }
        messages.extend(request.messages.iter().map(|m| {
            json!({
                "role": match m.role {
                    Role::System => "system",
                    Role::User => "user",
                    Role::Assistant => "assistant",
                },
                "content": m.content
            })
        }));

        let mut body = json!({
            "model": model,
            "messages": messages,
            "temperature": temperature
        });

        if let Some(max_tokens) = request.max_tokens.or(self.config.max_tokens) {
            body["max_tokens"] = json!(max_tokens);
        }

        body
    }

    /// Parse the API response into a CompletionResponse
    fn parse_response(&self, body: Value) -> Result<CompletionResponse> {
        let choice = body["choices"]
            .as_array()
            .and_then(|choices| choices.first())
            .ok_or_else(|| RoutrError::Llm("Response contained no choices".to_string()))?;

        let content = choice["message"]["content"]
            .as_str()
            .ok_or_else(|| {
                RoutrError::Llm(format!(
                    "Response message has no text content (finish_reason: {})",
                    choice["finish_reason"].as_str().unwrap_or("none")
                ))
            })?
            .to_string();
        let stop_reason = StopReason::from_finish_reason(choice["finish_reason"].as_str());

        let usage = match body.get("usage") {
            Some(u) => Usage::new(
                u["prompt_tokens"].as_u64().unwrap_or(0),
                u["completion_tokens"].as_u64().unwrap_or(0),
            ),
            None => Usage::default(),
        };

        if let Ok(mut total) = self.usage.lock() {
            total.add(&usage);
        }

        Ok(CompletionResponse {
            content,
            stop_reason,
            usage,
        })
    }

    /// Send one request, classifying failures as retryable or not
    async fn send_once(&self, body: &Value) -> std::result::Result<Value, AttemptError> {
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| AttemptError::Retryable {
                message: format!("Request failed: {}", e),
                retry_after: None,
            })?;

        let status = response.status();

        if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .map(Duration::from_secs);
            return Err(AttemptError::Retryable {
                message: "Rate limited".to_string(),
                retry_after,
            });
        }

        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            let message = format!("API error {}: {}", status, error_body);
            return Err(if status.is_server_error() {
                AttemptError::Retryable {
                    message,
                    retry_after: None,
                }
            } else {
                AttemptError::Fatal(message)
            });
        }

        response
            .json()
            .await
            .map_err(|e| AttemptError::Fatal(format!("Failed to parse response: {}", e)))
    }

    /// Send with the configured retry budget
    async fn send_request(&self, body: Value) -> Result<Value> {
        let mut attempt = 0;
        loop {
            match self.send_once(&body).await {
                Ok(value) => return Ok(value),
                Err(AttemptError::Fatal(message)) => return Err(RoutrError::Llm(message)),
                Err(AttemptError::Retryable { message, retry_after }) => {
                    if attempt >= self.config.max_retries {
                        return Err(RoutrError::Llm(message));
                    }
                    let delay = backoff_delay(attempt, retry_after);
                    warn!(
                        "LLM call failed ({}), retry {}/{} in {:?}",
                        message,
                        attempt + 1,
                        self.config.max_retries,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Get cumulative token usage
    pub fn total_usage(&self) -> Usage {
        self.usage.lock().map(|u| u.clone()).unwrap_or_default()
    }
}

/// Delay before retry number `attempt + 1`
fn backoff_delay(attempt: u32, retry_after: Option<Duration>) -> Duration {
    match retry_after {
        Some(delay) => delay.min(MAX_RETRY_AFTER),
        None => RETRY_BASE_DELAY * 2u32.saturating_pow(attempt),
    }
}

#[async_trait]
impl LlmClient for OpenAiCompatClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let body = self.build_request(&request);
        debug!("Sending {} messages to {}", request.messages.len(), self.endpoint());
        let response = self.send_request(body).await?;
        self.parse_response(response)
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    fn is_ready(&self) -> bool {
        !self.api_key.is_empty()
    }
}

impl std::fmt::Debug for OpenAiCompatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatClient")
            .field("base_url", &self.config.base_url)
            .field("model", &self.config.model)
            .finish()
    }
}
