use std::sync::Arc;

use tracing::{info, warn};

use super::domain::{
    GuildPolicy, PointsRecord, PolicyUpdate, Submission, SubmissionId, SubmissionQuery,
    SubmissionReceipt, SubmissionStatus, TenantId, MAX_LIST_LIMIT, SYSTEM_ACTOR,
};
use super::policy::{check_age, check_owner, decide, PreconditionFailure};
use super::repository::{GuildPolicyRepository, SubmissionRepository};
use crate::clock::{Clock, SystemClock};
use crate::error::ErrorKind;
use crate::workflows::content::{ContentError, ContentSource};
use crate::workflows::registration::{AccountId, AccountRepository};
use crate::workflows::repository::{Constraint, RepositoryError};
use crate::workflows::sentiment::{ClassificationError, Classifier};

#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("you are not registered; register a handle first")]
    NotRegistered,
    #[error("submission rejected: {0}")]
    Rejected(#[from] PreconditionFailure),
    #[error("could not fetch the post: {0}")]
    Content(#[from] ContentError),
    #[error("sentiment analysis failed: {0}")]
    Classification(#[from] ClassificationError),
    #[error("submission not found")]
    NotFound,
    #[error(transparent)]
    Repository(RepositoryError),
}

impl From<RepositoryError> for SubmissionError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict(Constraint::ContentStableId) => {
                Self::Rejected(PreconditionFailure::Duplicate)
            }
            RepositoryError::NotFound => Self::NotFound,
            other => Self::Repository(other),
        }
    }
}

impl SubmissionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SubmissionError::NotRegistered => ErrorKind::Validation,
            SubmissionError::Rejected(PreconditionFailure::Duplicate) => ErrorKind::Conflict,
            SubmissionError::Rejected(_) => ErrorKind::Validation,
            SubmissionError::Content(err) => err.kind(),
            SubmissionError::Classification(err) => err.kind(),
            SubmissionError::NotFound => ErrorKind::NotFound,
            SubmissionError::Repository(err) => err.kind(),
        }
    }
}

/// Runs the submission pipeline: fetch, preconditions, classify, decide, persist.
pub struct SubmissionService<S, A, P> {
    submissions: Arc<S>,
    accounts: Arc<A>,
    policies: Arc<P>,
    content: Arc<dyn ContentSource>,
    classifier: Arc<dyn Classifier>,
    clock: Arc<dyn Clock>,
    policy_defaults: GuildPolicy,
}

impl<S, A, P> SubmissionService<S, A, P>
where
    S: SubmissionRepository + 'static,
    A: AccountRepository + 'static,
    P: GuildPolicyRepository + 'static,
{
    pub fn new(
        submissions: Arc<S>,
        accounts: Arc<A>,
        policies: Arc<P>,
        content: Arc<dyn ContentSource>,
        classifier: Arc<dyn Classifier>,
        policy_defaults: GuildPolicy,
    ) -> Self {
        Self {
            submissions,
            accounts,
            policies,
            content,
            classifier,
            clock: Arc::new(SystemClock),
            policy_defaults,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Tenant policy, created from the configured defaults on first use.
    pub fn policy(&self, tenant: &TenantId) -> Result<GuildPolicy, SubmissionError> {
        if let Some(policy) = self.policies.policy(tenant)? {
            return Ok(policy);
        }
        self.policies.save_policy(tenant, self.policy_defaults)?;
        Ok(self.policy_defaults)
    }

    pub fn update_policy(
        &self,
        tenant: &TenantId,
        update: PolicyUpdate,
    ) -> Result<GuildPolicy, SubmissionError> {
        let mut policy = self.policy(tenant)?;
        policy.apply(update);
        self.policies.save_policy(tenant, policy)?;
        info!(%tenant, ?policy, "tenant policy updated");
        Ok(policy)
    }

    pub async fn submit(
        &self,
        tenant: &TenantId,
        account_id: &AccountId,
        reference: &str,
    ) -> Result<SubmissionReceipt, SubmissionError> {
        let registered_handle = self
            .accounts
            .account(account_id)?
            .and_then(|account| account.registered_handle)
            .ok_or(SubmissionError::NotRegistered)?;
        let policy = self.policy(tenant)?;

        let content = self.content.fetch(reference).await?;

        check_owner(&content, &registered_handle)?;
        check_age(&policy, &content, self.clock.now())?;
        if self.submissions.contains_stable_id(&content.stable_id)? {
            warn!(%tenant, stable_id = %content.stable_id, "duplicate submission");
            return Err(PreconditionFailure::Duplicate.into());
        }

        let classification = self.classifier.classify(&content.text_content).await?;
        let decision = decide(&policy, content.bullish, &classification.result);

        let now = self.clock.now();
        let automated = decision.status != SubmissionStatus::PendingReview;
        let submission = Submission {
            id: SubmissionId::generate(),
            tenant_id: tenant.clone(),
            account_id: account_id.clone(),
            reference: reference.to_string(),
            content,
            classification,
            status: decision.status,
            decision_reason: decision.reason,
            decided_at: automated.then_some(now),
            decided_by: automated.then(|| SYSTEM_ACTOR.to_string()),
            points: PointsRecord::default(),
            created_at: now,
        };

        let stored = self.submissions.insert(submission)?;
        info!(
            %tenant,
            submission_id = %stored.id,
            status = stored.status.as_str(),
            "submission recorded"
        );
        Ok(stored.receipt())
    }

    /// Looks up a submission, hiding rows owned by other tenants.
    pub fn get(&self, tenant: &TenantId, id: &SubmissionId) -> Result<Submission, SubmissionError> {
        match self.submissions.fetch(id)? {
            Some(submission) if &submission.tenant_id == tenant => Ok(submission),
            _ => Err(SubmissionError::NotFound),
        }
    }

    pub fn list(
        &self,
        tenant: &TenantId,
        mut query: SubmissionQuery,
    ) -> Result<Vec<Submission>, SubmissionError> {
        query.limit = query.limit.clamp(1, MAX_LIST_LIMIT);
        Ok(self.submissions.list(tenant, &query)?)
    }
}
