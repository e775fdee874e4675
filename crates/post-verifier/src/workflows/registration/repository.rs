use chrono::{DateTime, Utc};

use super::domain::{Account, AccountId, PendingId, PendingRegistration};
use crate::workflows::repository::RepositoryError;

/// Storage port for accounts and their pending registrations.
///
/// Implementations must reject a second active pending row per account and a reused code with
/// `RepositoryError::Conflict`, and must apply `complete_registration` atomically.
pub trait AccountRepository: Send + Sync {
    fn account(&self, id: &AccountId) -> Result<Option<Account>, RepositoryError>;

    /// Returns the existing account or creates an unregistered one.
    fn ensure_account(&self, id: &AccountId) -> Result<Account, RepositoryError>;

    /// Most recently issued pending row that is unconsumed and unexpired at `now`.
    fn active_pending(
        &self,
        id: &AccountId,
        now: DateTime<Utc>,
    ) -> Result<Option<PendingRegistration>, RepositoryError>;

    fn insert_pending(&self, pending: PendingRegistration) -> Result<(), RepositoryError>;

    /// Sets the handle and consumes the pending row in one step.
    ///
    /// Fails with `NotFound` when the pending row is no longer active at `at`.
    fn complete_registration(
        &self,
        id: &AccountId,
        pending: &PendingId,
        handle: &str,
        at: DateTime<Utc>,
    ) -> Result<Account, RepositoryError>;

    /// Clears the registered handle and consumes every outstanding pending row.
    fn reset_registration(&self, id: &AccountId, at: DateTime<Utc>) -> Result<(), RepositoryError>;
}
