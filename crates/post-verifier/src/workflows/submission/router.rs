use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use super::domain::{PolicyUpdate, SubmissionId, SubmissionQuery, SubmissionStatus, TenantId};
use super::repository::{GuildPolicyRepository, SubmissionRepository};
use super::service::{SubmissionError, SubmissionService};
use crate::error::{error_response, ErrorKind};
use crate::workflows::content::extract_post_reference;
use crate::workflows::registration::{AccountId, AccountRepository};

type SharedService<S, A, P> = Arc<SubmissionService<S, A, P>>;

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub account_id: String,
    pub post: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub status: Option<String>,
    pub unawarded: Option<bool>,
    pub q: Option<String>,
    pub limit: Option<usize>,
}

impl ListParams {
    fn into_query(self) -> Result<SubmissionQuery, Response> {
        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(SubmissionStatus::parse(&raw.to_uppercase()).ok_or_else(|| {
                error_response(ErrorKind::Validation, format!("unknown status filter: {raw}"))
            })?),
        };
        let defaults = SubmissionQuery::default();
        Ok(SubmissionQuery {
            status,
            unawarded: self.unawarded.unwrap_or(false),
            search: self.q,
            limit: self.limit.unwrap_or(defaults.limit),
        })
    }
}

/// Router builder exposing submission intake, listing, lookup, and tenant policy.
pub fn submission_router<S, A, P>(service: SharedService<S, A, P>) -> Router
where
    S: SubmissionRepository + 'static,
    A: AccountRepository + 'static,
    P: GuildPolicyRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/guilds/:guild_id/submissions",
            get(list_handler::<S, A, P>).post(submit_handler::<S, A, P>),
        )
        .route(
            "/api/v1/guilds/:guild_id/submissions/:submission_id",
            get(fetch_handler::<S, A, P>),
        )
        .route(
            "/api/v1/guilds/:guild_id/config",
            get(policy_handler::<S, A, P>).post(update_policy_handler::<S, A, P>),
        )
        .with_state(service)
}

fn rejected(error: SubmissionError) -> Response {
    error_response(error.kind(), error.to_string())
}

pub(crate) fn parse_submission_id(raw: &str) -> Result<SubmissionId, Response> {
    SubmissionId::parse(raw)
        .ok_or_else(|| error_response(ErrorKind::NotFound, "submission not found".to_string()))
}

pub(crate) async fn submit_handler<S, A, P>(
    State(service): State<SharedService<S, A, P>>,
    Path(guild_id): Path<String>,
    Json(request): Json<SubmitRequest>,
) -> Response
where
    S: SubmissionRepository + 'static,
    A: AccountRepository + 'static,
    P: GuildPolicyRepository + 'static,
{
    let reference = extract_post_reference(&request.post);
    match service
        .submit(&TenantId(guild_id), &AccountId(request.account_id), &reference)
        .await
    {
        Ok(receipt) => (StatusCode::CREATED, Json(receipt)).into_response(),
        Err(error) => rejected(error),
    }
}

pub(crate) async fn list_handler<S, A, P>(
    State(service): State<SharedService<S, A, P>>,
    Path(guild_id): Path<String>,
    Query(params): Query<ListParams>,
) -> Response
where
    S: SubmissionRepository + 'static,
    A: AccountRepository + 'static,
    P: GuildPolicyRepository + 'static,
{
    let query = match params.into_query() {
        Ok(query) => query,
        Err(response) => return response,
    };
    match service.list(&TenantId(guild_id), query) {
        Ok(submissions) => Json(submissions).into_response(),
        Err(error) => rejected(error),
    }
}

pub(crate) async fn fetch_handler<S, A, P>(
    State(service): State<SharedService<S, A, P>>,
    Path((guild_id, submission_id)): Path<(String, String)>,
) -> Response
where
    S: SubmissionRepository + 'static,
    A: AccountRepository + 'static,
    P: GuildPolicyRepository + 'static,
{
    let id = match parse_submission_id(&submission_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    match service.get(&TenantId(guild_id), &id) {
        Ok(submission) => Json(submission).into_response(),
        Err(error) => rejected(error),
    }
}

pub(crate) async fn policy_handler<S, A, P>(
    State(service): State<SharedService<S, A, P>>,
    Path(guild_id): Path<String>,
) -> Response
where
    S: SubmissionRepository + 'static,
    A: AccountRepository + 'static,
    P: GuildPolicyRepository + 'static,
{
    match service.policy(&TenantId(guild_id)) {
        Ok(policy) => Json(policy).into_response(),
        Err(error) => rejected(error),
    }
}

pub(crate) async fn update_policy_handler<S, A, P>(
    State(service): State<SharedService<S, A, P>>,
    Path(guild_id): Path<String>,
    Json(update): Json<PolicyUpdate>,
) -> Response
where
    S: SubmissionRepository + 'static,
    A: AccountRepository + 'static,
    P: GuildPolicyRepository + 'static,
{
    match service.update_policy(&TenantId(guild_id), update) {
        Ok(policy) => Json(policy).into_response(),
        Err(error) => rejected(error),
    }
}
