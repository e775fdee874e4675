use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use super::catalog::ModelCatalog;
use super::client::{ChatMessage, CompletionClient, CompletionRequest, UpstreamError};
use super::domain::Classification;
use super::parse::{extract_json, interpret};
use crate::error::ErrorKind;

pub const SYSTEM_PROMPT: &str = "You are a sentiment classifier for CoinMarketCap community posts.
Classify the overall sentiment expressed in the text (multilingual).
Return STRICT JSON only (no markdown) matching this schema:
{
  \"label\": \"positive\" | \"neutral\" | \"negative\",
  \"confidence\": number between 0 and 1,
  \"language\": string (detected language code, e.g. \"en\", \"es\", \"zh\"),
  \"rationale\": string (brief, 1-2 sentences)
}
Be conservative: if mixed or unclear, choose \"neutral\".";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClassificationError {
    #[error("classifier did not return valid JSON")]
    InvalidJson,
    #[error("classifier returned invalid label '{0}'")]
    InvalidLabel(String),
    #[error("classifier unavailable: {0}")]
    Upstream(String),
}

impl ClassificationError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Classification
    }
}

impl From<UpstreamError> for ClassificationError {
    fn from(err: UpstreamError) -> Self {
        Self::Upstream(err.to_string())
    }
}

/// Single-text sentiment classification.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<Classification, ClassificationError>;
}

/// LLM-backed classifier with a one-shot retry when the preferred model is unknown upstream.
pub struct SentimentClassifier {
    client: Arc<dyn CompletionClient>,
    catalog: ModelCatalog,
    preferred_model: String,
    fallback_model: String,
}

impl SentimentClassifier {
    pub fn new(
        client: Arc<dyn CompletionClient>,
        preferred_model: impl Into<String>,
        fallback_model: impl Into<String>,
    ) -> Self {
        Self::with_catalog(client, preferred_model, fallback_model, ModelCatalog::default())
    }

    pub fn with_catalog(
        client: Arc<dyn CompletionClient>,
        preferred_model: impl Into<String>,
        fallback_model: impl Into<String>,
        catalog: ModelCatalog,
    ) -> Self {
        Self {
            client,
            catalog,
            preferred_model: preferred_model.into(),
            fallback_model: fallback_model.into(),
        }
    }

    fn request(model: &str, text: &str) -> CompletionRequest {
        CompletionRequest {
            model: model.to_string(),
            temperature: 0.0,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: text.to_string(),
                },
            ],
        }
    }

    /// Preferred model if listed, else the secondary default if listed, else the first listed.
    fn pick_model(&self, available: &[String]) -> Option<String> {
        let listed = |wanted: &str| {
            available
                .iter()
                .find(|model| model.eq_ignore_ascii_case(wanted))
                .cloned()
        };
        listed(&self.preferred_model)
            .or_else(|| listed(&self.fallback_model))
            .or_else(|| available.first().cloned())
    }

    async fn complete_with_fallback(&self, text: &str) -> Result<(String, String), ClassificationError> {
        let request = Self::request(&self.preferred_model, text);
        match self.client.complete(&request).await {
            Ok(content) => Ok((self.preferred_model.clone(), content)),
            Err(UpstreamError::ModelNotFound(message)) => {
                warn!(model = %self.preferred_model, %message, "preferred model unavailable");
                let available = self.catalog.models(self.client.as_ref()).await?;
                let model = self.pick_model(&available).ok_or_else(|| {
                    ClassificationError::Upstream("provider lists no models".to_string())
                })?;
                info!(model = %model, "retrying classification with fallback model");
                let content = self.client.complete(&Self::request(&model, text)).await?;
                Ok((model, content))
            }
            Err(other) => Err(other.into()),
        }
    }
}

#[async_trait]
impl Classifier for SentimentClassifier {
    async fn classify(&self, text: &str) -> Result<Classification, ClassificationError> {
        let (model, content) = self.complete_with_fallback(text).await?;
        let raw = extract_json(&content)?;
        let result = interpret(&raw)?;
        info!(
            model = %model,
            label = %result.label,
            confidence = result.confidence,
            "classified sentiment"
        );
        Ok(Classification { result, raw, model })
    }
}
