use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::clock::{Clock, SystemClock};
use crate::error::ErrorKind;
use crate::workflows::repository::RepositoryError;
use crate::workflows::submission::{
    PointsRecord, Submission, SubmissionId, SubmissionRepository, SubmissionStatus, TenantId,
};

pub const DEFAULT_CURRENCY: &str = "points";
const APPROVED_REASON: &str = "Approved by moderator.";
const REJECTED_REASON: &str = "Rejected by moderator.";

#[derive(Debug, thiserror::Error)]
pub enum ModerationError {
    #[error("{0}")]
    Validation(String),
    #[error("submission not found")]
    NotFound,
    #[error(transparent)]
    Repository(RepositoryError),
}

impl From<RepositoryError> for ModerationError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound,
            other => Self::Repository(other),
        }
    }
}

impl ModerationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ModerationError::Validation(_) => ErrorKind::Validation,
            ModerationError::NotFound => ErrorKind::NotFound,
            ModerationError::Repository(err) => err.kind(),
        }
    }
}

/// Floors a points amount, rejecting values that are negative, non-finite, or beyond `i64`.
fn points_amount(amount: f64) -> Result<i64, ModerationError> {
    let floored = amount.floor();
    // `i64::MAX as f64` rounds up to 2^63, which is itself out of range.
    if !floored.is_finite() || floored < 0.0 || floored >= i64::MAX as f64 {
        return Err(ModerationError::Validation(
            "points amount must be a non-negative number within range".to_string(),
        ));
    }
    Ok(floored as i64)
}

/// Moderator actions applied to a stored submission.
#[derive(Debug, Clone, PartialEq)]
pub enum ModerationAction {
    Approve,
    Reject {
        reason: Option<String>,
    },
    AwardPoints {
        amount: f64,
        currency: Option<String>,
        note: Option<String>,
    },
    RevokePoints {
        note: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModerationReceipt {
    pub submission_id: SubmissionId,
    pub status: SubmissionStatus,
    pub decision_reason: String,
    pub points: PointsRecord,
}

impl From<&Submission> for ModerationReceipt {
    fn from(submission: &Submission) -> Self {
        Self {
            submission_id: submission.id,
            status: submission.status,
            decision_reason: submission.decision_reason.clone(),
            points: submission.points.clone(),
        }
    }
}

/// Manual overrides and the points sub-ledger.
///
/// Status and points are independent: awarding does not require approval and
/// rejecting does not clear an award.
pub struct ModerationLedger<S> {
    submissions: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S> ModerationLedger<S>
where
    S: SubmissionRepository + 'static,
{
    pub fn new(submissions: Arc<S>) -> Self {
        Self {
            submissions,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn moderate(
        &self,
        tenant: &TenantId,
        id: &SubmissionId,
        actor: &str,
        action: ModerationAction,
    ) -> Result<ModerationReceipt, ModerationError> {
        let now = self.clock.now();
        let actor_name = actor.to_string();

        let apply: Box<dyn FnOnce(&mut Submission)> = match action {
            ModerationAction::Approve => Box::new(move |submission: &mut Submission| {
                submission.status = SubmissionStatus::Approved;
                submission.decision_reason = APPROVED_REASON.to_string();
                submission.decided_at = Some(now);
                submission.decided_by = Some(actor_name);
            }),
            ModerationAction::Reject { reason } => {
                let reason = reason
                    .map(|reason| reason.trim().to_string())
                    .filter(|reason| !reason.is_empty())
                    .unwrap_or_else(|| REJECTED_REASON.to_string());
                Box::new(move |submission: &mut Submission| {
                    submission.status = SubmissionStatus::Rejected;
                    submission.decision_reason = reason;
                    submission.decided_at = Some(now);
                    submission.decided_by = Some(actor_name);
                })
            }
            ModerationAction::AwardPoints {
                amount,
                currency,
                note,
            } => {
                let amount = points_amount(amount)?;
                let currency = currency
                    .map(|currency| currency.trim().to_string())
                    .filter(|currency| !currency.is_empty())
                    .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());
                Box::new(move |submission: &mut Submission| {
                    submission.points = PointsRecord {
                        awarded: true,
                        amount: Some(amount),
                        currency: Some(currency),
                        awarded_at: Some(now),
                        awarded_by: Some(actor_name),
                        note,
                    };
                })
            }
            ModerationAction::RevokePoints { note } => Box::new(move |submission: &mut Submission| {
                submission.points = PointsRecord {
                    note,
                    ..PointsRecord::default()
                };
            }),
        };

        // Tenant check and field changes happen under a single repository step.
        let submission = self
            .submissions
            .modify(id, |submission| {
                if &submission.tenant_id != tenant {
                    return Err(RepositoryError::NotFound);
                }
                apply(submission);
                Ok(())
            })?;
        info!(
            %tenant,
            submission_id = %submission.id,
            actor,
            status = submission.status.as_str(),
            awarded = submission.points.awarded,
            "moderation applied"
        );
        Ok(ModerationReceipt::from(&submission))
    }

    pub fn approve(
        &self,
        tenant: &TenantId,
        id: &SubmissionId,
        actor: &str,
    ) -> Result<ModerationReceipt, ModerationError> {
        self.moderate(tenant, id, actor, ModerationAction::Approve)
    }

    pub fn reject(
        &self,
        tenant: &TenantId,
        id: &SubmissionId,
        actor: &str,
        reason: Option<String>,
    ) -> Result<ModerationReceipt, ModerationError> {
        self.moderate(tenant, id, actor, ModerationAction::Reject { reason })
    }

    pub fn award_points(
        &self,
        tenant: &TenantId,
        id: &SubmissionId,
        actor: &str,
        amount: f64,
        currency: Option<String>,
        note: Option<String>,
    ) -> Result<ModerationReceipt, ModerationError> {
        self.moderate(
            tenant,
            id,
            actor,
            ModerationAction::AwardPoints {
                amount,
                currency,
                note,
            },
        )
    }

    pub fn revoke_points(
        &self,
        tenant: &TenantId,
        id: &SubmissionId,
        actor: &str,
        note: Option<String>,
    ) -> Result<ModerationReceipt, ModerationError> {
        self.moderate(tenant, id, actor, ModerationAction::RevokePoints { note })
    }
}
