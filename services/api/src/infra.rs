use metrics_exporter_prometheus::PrometheusHandle;
use post_verifier::config::AppConfig;
use post_verifier::error::AppError;
use post_verifier::workflows::content::{ApifyTaskClient, ContentFetcher};
use post_verifier::workflows::sentiment::{ModelCatalog, OpenAiCompatibleClient, SentimentClassifier};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn build_content_fetcher(
    config: &AppConfig,
) -> Result<ContentFetcher<ApifyTaskClient>, AppError> {
    let jobs = ApifyTaskClient::from_config(&config.extraction)?;
    Ok(ContentFetcher::with_budget(
        jobs,
        config.extraction.timeout,
        config.extraction.poll_interval,
    ))
}

pub(crate) fn build_classifier(config: &AppConfig) -> Result<SentimentClassifier, AppError> {
    let client = OpenAiCompatibleClient::from_config(&config.classifier)?;
    Ok(SentimentClassifier::with_catalog(
        Arc::new(client),
        config.classifier.preferred_model.clone(),
        config.classifier.fallback_model.clone(),
        ModelCatalog::new(config.classifier.model_cache_ttl),
    ))
}
