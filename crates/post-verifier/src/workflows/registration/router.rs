use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::AccountId;
use super::repository::AccountRepository;
use super::service::{RegistrationError, RegistrationService};
use crate::error::error_response;
use crate::workflows::content::extract_post_reference;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub account_id: String,
    pub handle: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub account_id: String,
    pub post: String,
}

/// Router builder exposing registration, verification, and reset.
pub fn registration_router<R>(service: Arc<RegistrationService<R>>) -> Router
where
    R: AccountRepository + 'static,
{
    Router::new()
        .route("/api/v1/registrations", post(register_handler::<R>))
        .route("/api/v1/registrations/verify", post(verify_handler::<R>))
        .route(
            "/api/v1/accounts/:account_id/registration",
            delete(reset_handler::<R>),
        )
        .with_state(service)
}

fn rejected(error: RegistrationError) -> Response {
    match error {
        RegistrationError::ActiveCodeExists { issued } => {
            let payload = json!({
                "error": format!("an active registration code already exists for {}", issued.handle),
                "kind": "conflict",
                "code": issued.code,
                "expires_at": issued.expires_at,
            });
            (StatusCode::CONFLICT, Json(payload)).into_response()
        }
        other => error_response(other.kind(), other.to_string()),
    }
}

pub(crate) async fn register_handler<R>(
    State(service): State<Arc<RegistrationService<R>>>,
    Json(request): Json<RegisterRequest>,
) -> Response
where
    R: AccountRepository + 'static,
{
    match service.register(&AccountId(request.account_id), &request.handle) {
        Ok(issued) => (StatusCode::CREATED, Json(issued)).into_response(),
        Err(error) => rejected(error),
    }
}

pub(crate) async fn verify_handler<R>(
    State(service): State<Arc<RegistrationService<R>>>,
    Json(request): Json<VerifyRequest>,
) -> Response
where
    R: AccountRepository + 'static,
{
    let reference = extract_post_reference(&request.post);
    match service
        .verify(&AccountId(request.account_id), &reference)
        .await
    {
        Ok(verified) => (StatusCode::OK, Json(verified)).into_response(),
        Err(error) => rejected(error),
    }
}

pub(crate) async fn reset_handler<R>(
    State(service): State<Arc<RegistrationService<R>>>,
    Path(account_id): Path<String>,
) -> Response
where
    R: AccountRepository + 'static,
{
    match service.reset(&AccountId(account_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => rejected(error),
    }
}
