use crate::cli::ServeArgs;
use crate::infra::{build_classifier, build_content_fetcher, AppState};
use crate::routes::with_workflow_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use post_verifier::config::AppConfig;
use post_verifier::error::AppError;
use post_verifier::store::MemoryStore;
use post_verifier::telemetry;
use post_verifier::workflows::content::ContentSource;
use post_verifier::workflows::moderation::ModerationLedger;
use post_verifier::workflows::registration::RegistrationService;
use post_verifier::workflows::sentiment::Classifier;
use post_verifier::workflows::submission::SubmissionService;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(MemoryStore::new());
    let content: Arc<dyn ContentSource> = Arc::new(build_content_fetcher(&config)?);
    let classifier: Arc<dyn Classifier> = Arc::new(build_classifier(&config)?);

    let registrations = Arc::new(RegistrationService::new(store.clone(), content.clone()));
    let submissions = Arc::new(SubmissionService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        content,
        classifier,
        config.policy_defaults,
    ));
    let ledger = Arc::new(ModerationLedger::new(store));

    let app = with_workflow_routes(registrations, submissions, ledger)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "post verifier ready");

    axum::serve(listener, app).await?;
    Ok(())
}
