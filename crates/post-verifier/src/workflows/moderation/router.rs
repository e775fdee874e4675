use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Deserialize;

use super::ledger::{ModerationAction, ModerationLedger};
use crate::error::error_response;
use crate::workflows::submission::router::parse_submission_id;
use crate::workflows::submission::{SubmissionRepository, TenantId};

#[derive(Debug, Deserialize)]
pub struct ApproveRequest {
    pub actor_id: String,
}

#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    pub actor_id: String,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AwardRequest {
    pub actor_id: String,
    pub amount: f64,
    pub currency: Option<String>,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RevokeRequest {
    pub actor_id: String,
    pub note: Option<String>,
}

/// Router builder exposing moderator overrides and the points ledger.
pub fn moderation_router<S>(ledger: Arc<ModerationLedger<S>>) -> Router
where
    S: SubmissionRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/guilds/:guild_id/submissions/:submission_id/approve",
            post(approve_handler::<S>),
        )
        .route(
            "/api/v1/guilds/:guild_id/submissions/:submission_id/reject",
            post(reject_handler::<S>),
        )
        .route(
            "/api/v1/guilds/:guild_id/submissions/:submission_id/points/award",
            post(award_handler::<S>),
        )
        .route(
            "/api/v1/guilds/:guild_id/submissions/:submission_id/points/revoke",
            post(revoke_handler::<S>),
        )
        .with_state(ledger)
}

fn apply<S>(
    ledger: &ModerationLedger<S>,
    guild_id: String,
    submission_id: &str,
    actor: &str,
    action: ModerationAction,
) -> Response
where
    S: SubmissionRepository + 'static,
{
    let id = match parse_submission_id(submission_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    match ledger.moderate(&TenantId(guild_id), &id, actor, action) {
        Ok(receipt) => Json(receipt).into_response(),
        Err(error) => error_response(error.kind(), error.to_string()),
    }
}

pub(crate) async fn approve_handler<S>(
    State(ledger): State<Arc<ModerationLedger<S>>>,
    Path((guild_id, submission_id)): Path<(String, String)>,
    Json(request): Json<ApproveRequest>,
) -> Response
where
    S: SubmissionRepository + 'static,
{
    apply(
        &ledger,
        guild_id,
        &submission_id,
        &request.actor_id,
        ModerationAction::Approve,
    )
}

pub(crate) async fn reject_handler<S>(
    State(ledger): State<Arc<ModerationLedger<S>>>,
    Path((guild_id, submission_id)): Path<(String, String)>,
    Json(request): Json<RejectRequest>,
) -> Response
where
    S: SubmissionRepository + 'static,
{
    apply(
        &ledger,
        guild_id,
        &submission_id,
        &request.actor_id,
        ModerationAction::Reject {
            reason: request.reason,
        },
    )
}

pub(crate) async fn award_handler<S>(
    State(ledger): State<Arc<ModerationLedger<S>>>,
    Path((guild_id, submission_id)): Path<(String, String)>,
    Json(request): Json<AwardRequest>,
) -> Response
where
    S: SubmissionRepository + 'static,
{
    apply(
        &ledger,
        guild_id,
        &submission_id,
        &request.actor_id,
        ModerationAction::AwardPoints {
            amount: request.amount,
            currency: request.currency,
            note: request.note,
        },
    )
}

pub(crate) async fn revoke_handler<S>(
    State(ledger): State<Arc<ModerationLedger<S>>>,
    Path((guild_id, submission_id)): Path<(String, String)>,
    Json(request): Json<RevokeRequest>,
) -> Response
where
    S: SubmissionRepository + 'static,
{
    apply(
        &ledger,
        guild_id,
        &submission_id,
        &request.actor_id,
        ModerationAction::RevokePoints { note: request.note },
    )
}
