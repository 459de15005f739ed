use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use kopi_core::config::LlmConfig;

/// Completion failures, split by whether retrying can help. Timeouts and
/// transport-level problems are retryable; a rejected request or a malformed
/// body will not get better on a second attempt.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LlmError {
    #[error("llm request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },
    #[error("llm transport failure: {0}")]
    Transport(String),
    #[error("llm endpoint rejected the request: {0}")]
    Rejected(String),
    #[error("llm returned a malformed response: {0}")]
    Malformed(String),
}

impl LlmError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Transport(_))
    }
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}

/// Client for an OpenAI-compatible `/v1/chat/completions` endpoint. Both
/// supported providers (openai, ollama) speak this surface.
pub struct HttpLlmClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<SecretString>,
    model: String,
    timeout_secs: u64,
    max_retries: u32,
}

const OPENAI_BASE_URL: &str = "https://api.openai.com";

impl HttpLlmClient {
    pub fn from_config(config: &LlmConfig) -> Self {
        let base_url = config
            .base_url
            .as_deref()
            .unwrap_or(OPENAI_BASE_URL)
            .trim_end_matches('/')
            .to_string();

        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .unwrap_or_default(),
            endpoint: format!("{base_url}/v1/chat/completions"),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            timeout_secs: config.timeout_secs,
            max_retries: config.max_retries,
        }
    }

    async fn complete_once(&self, prompt: &str) -> Result<String, LlmError> {
        let payload = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage { role: "user", content: prompt }],
            temperature: 0.7,
        };

        let mut request = self.client.post(&self.endpoint).json(&payload);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key.expose_secret());
        }

        let response = request.send().await.map_err(|error| {
            if error.is_timeout() {
                LlmError::Timeout { timeout_secs: self.timeout_secs }
            } else {
                LlmError::Transport(error.to_string())
            }
        })?;

        let status = response.status();
        if status.is_server_error() {
            return Err(LlmError::Transport(format!("server returned {status}")));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Rejected(format!("{status}: {body}")));
        }

        let completion: ChatResponse =
            response.json().await.map_err(|error| LlmError::Malformed(error.to_string()))?;
        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| LlmError::Malformed("response contained no choices".to_string()))
    }
}

#[async_trait]
impl LlmClient for HttpLlmClient {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        with_retries(self.max_retries, || self.complete_once(prompt)).await
    }
}

/// Run `operation` up to `max_retries` extra times, backing off between
/// attempts. Only retryable errors trigger another attempt; terminal errors
/// return immediately.
async fn with_retries<T, F, Fut>(max_retries: u32, mut operation: F) -> Result<T, LlmError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, LlmError>>,
{
    let mut attempt: u32 = 0;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) if error.is_retryable() && attempt < max_retries => {
                attempt += 1;
                let backoff = Duration::from_millis(250 * 2u64.pow(attempt.min(6)));
                warn!(
                    event_name = "llm.request.retry",
                    attempt,
                    backoff_ms = backoff.as_millis() as u64,
                    error = %error,
                    "retrying llm completion"
                );
                tokio::time::sleep(backoff).await;
            }
            Err(error) => return Err(error),
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: String,
}
