use super::domain::{GuildPolicy, Submission, SubmissionId, SubmissionQuery, TenantId};
use crate::workflows::repository::RepositoryError;

/// Storage port for submissions. `stable_id` is unique across every tenant.
pub trait SubmissionRepository: Send + Sync {
    /// Fails with `Conflict(ContentStableId)` when the content was already submitted.
    fn insert(&self, submission: Submission) -> Result<Submission, RepositoryError>;
    /// Applies `change` to the stored record and persists it atomically, returning the result.
    ///
    /// An error from `change` leaves the record untouched.
    fn modify<F>(&self, id: &SubmissionId, change: F) -> Result<Submission, RepositoryError>
    where
        F: FnOnce(&mut Submission) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &SubmissionId) -> Result<Option<Submission>, RepositoryError>;
    fn contains_stable_id(&self, stable_id: &str) -> Result<bool, RepositoryError>;
    /// Newest first, at most `query.limit` rows.
    fn list(
        &self,
        tenant: &TenantId,
        query: &SubmissionQuery,
    ) -> Result<Vec<Submission>, RepositoryError>;
}

pub trait GuildPolicyRepository: Send + Sync {
    fn policy(&self, tenant: &TenantId) -> Result<Option<GuildPolicy>, RepositoryError>;
    fn save_policy(&self, tenant: &TenantId, policy: GuildPolicy) -> Result<(), RepositoryError>;
}
