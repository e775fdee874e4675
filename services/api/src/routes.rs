use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Extension;
use axum::Json;
use post_verifier::workflows::moderation::{moderation_router, ModerationLedger};
use post_verifier::workflows::registration::{
    registration_router, AccountRepository, RegistrationService,
};
use post_verifier::workflows::submission::{
    submission_router, GuildPolicyRepository, SubmissionRepository, SubmissionService,
};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_workflow_routes<S, A, P>(
    registrations: Arc<RegistrationService<A>>,
    submissions: Arc<SubmissionService<S, A, P>>,
    ledger: Arc<ModerationLedger<S>>,
) -> axum::Router
where
    S: SubmissionRepository + 'static,
    A: AccountRepository + 'static,
    P: GuildPolicyRepository + 'static,
{
    registration_router(registrations)
        .merge(submission_router(submissions))
        .merge(moderation_router(ledger))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
