use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{ClassifierConfig, ConfigError};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

/// One chat-completion call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub temperature: f32,
    pub messages: Vec<ChatMessage>,
}

/// Upstream failure classes. Only `ModelNotFound` is eligible for the fallback retry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UpstreamError {
    #[error("model not found: {0}")]
    ModelNotFound(String),
    #[error("rate limited: {0}")]
    RateLimited(String),
    #[error("authentication rejected: {0}")]
    Unauthorized(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("completion service error: {0}")]
    Service(String),
}

/// OpenAI-compatible completion provider.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Returns the assistant message content of the first choice.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, UpstreamError>;

    async fn list_models(&self) -> Result<Vec<String>, UpstreamError>;
}

pub struct OpenAiCompatibleClient {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ModelList {
    #[serde(default)]
    data: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    id: String,
}

impl OpenAiCompatibleClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    pub fn from_config(config: &ClassifierConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(&config.base_url, config.api_key()?))
    }
}

fn network(err: reqwest::Error) -> UpstreamError {
    UpstreamError::Network(err.to_string())
}

/// Maps an unsuccessful HTTP reply onto an upstream failure class.
pub(crate) fn classify_failure(status: StatusCode, body: &str) -> UpstreamError {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .pointer("/error/message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.chars().take(200).collect());
    let lowered = message.to_ascii_lowercase();
    let mentions_missing_model = lowered.contains("model")
        && (lowered.contains("not found")
            || lowered.contains("does not exist")
            || lowered.contains("not available"));

    match status {
        StatusCode::TOO_MANY_REQUESTS => UpstreamError::RateLimited(message),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => UpstreamError::Unauthorized(message),
        _ if mentions_missing_model => UpstreamError::ModelNotFound(message),
        StatusCode::NOT_FOUND => UpstreamError::ModelNotFound(message),
        _ => UpstreamError::Service(format!("{status}: {message}")),
    }
}

#[async_trait]
impl CompletionClient for OpenAiCompatibleClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, UpstreamError> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(network)?;

        let status = response.status();
        let body = response.text().await.map_err(network)?;
        if !status.is_success() {
            return Err(classify_failure(status, &body));
        }
        debug!(model = %request.model, bytes = body.len(), "completion received");

        let parsed: CompletionResponse = serde_json::from_str(&body)
            .map_err(|err| UpstreamError::Service(format!("malformed completion response: {err}")))?;
        Ok(parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .unwrap_or_default())
    }

    async fn list_models(&self) -> Result<Vec<String>, UpstreamError> {
        let response = self
            .client
            .get(format!("{}/models", self.base_url))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(network)?;

        let status = response.status();
        let body = response.text().await.map_err(network)?;
        if !status.is_success() {
            return Err(classify_failure(status, &body));
        }

        let parsed: ModelList = serde_json::from_str(&body)
            .map_err(|err| UpstreamError::Service(format!("malformed model list: {err}")))?;
        Ok(parsed.data.into_iter().map(|entry| entry.id).collect())
    }
}
