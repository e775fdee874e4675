use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use crate::workflows::registration::{
    Account, AccountId, AccountRepository, PendingId, PendingRegistration,
};
use crate::workflows::repository::{Constraint, RepositoryError};
use crate::workflows::submission::{
    GuildPolicy, GuildPolicyRepository, Submission, SubmissionId, SubmissionQuery,
    SubmissionRepository, TenantId,
};

#[derive(Default)]
struct Tables {
    accounts: HashMap<AccountId, Account>,
    pending: Vec<PendingRegistration>,
    issued_codes: HashSet<String>,
    submissions: HashMap<SubmissionId, Submission>,
    stable_ids: HashSet<String>,
    policies: HashMap<TenantId, GuildPolicy>,
}

/// Process-local store enforcing the same uniqueness rules a database would.
///
/// Every check-then-write happens under one lock, so a losing concurrent writer
/// observes `RepositoryError::Conflict`.
#[derive(Default, Clone)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, RepositoryError> {
        self.tables
            .lock()
            .map_err(|_| RepositoryError::Unavailable("memory store lock poisoned".to_string()))
    }
}

impl AccountRepository for MemoryStore {
    fn account(&self, id: &AccountId) -> Result<Option<Account>, RepositoryError> {
        Ok(self.lock()?.accounts.get(id).cloned())
    }

    fn ensure_account(&self, id: &AccountId) -> Result<Account, RepositoryError> {
        let mut tables = self.lock()?;
        Ok(tables
            .accounts
            .entry(id.clone())
            .or_insert_with(|| Account::new(id.clone()))
            .clone())
    }

    fn active_pending(
        &self,
        id: &AccountId,
        now: DateTime<Utc>,
    ) -> Result<Option<PendingRegistration>, RepositoryError> {
        let tables = self.lock()?;
        Ok(tables
            .pending
            .iter()
            .filter(|pending| &pending.account_id == id && pending.is_active(now))
            .max_by_key(|pending| pending.issued_at)
            .cloned())
    }

    fn insert_pending(&self, pending: PendingRegistration) -> Result<(), RepositoryError> {
        let mut tables = self.lock()?;
        if tables.issued_codes.contains(&pending.code) {
            return Err(RepositoryError::Conflict(Constraint::RegistrationCode));
        }
        let has_active = tables.pending.iter().any(|existing| {
            existing.account_id == pending.account_id && existing.is_active(pending.issued_at)
        });
        if has_active {
            return Err(RepositoryError::Conflict(Constraint::ActiveRegistration));
        }
        tables.issued_codes.insert(pending.code.clone());
        tables.pending.push(pending);
        Ok(())
    }

    fn complete_registration(
        &self,
        id: &AccountId,
        pending: &PendingId,
        handle: &str,
        at: DateTime<Utc>,
    ) -> Result<Account, RepositoryError> {
        let mut tables = self.lock()?;
        let already_registered = tables
            .accounts
            .get(id)
            .ok_or(RepositoryError::NotFound)?
            .is_registered();
        if already_registered {
            return Err(RepositoryError::Conflict(
                Constraint::AccountAlreadyRegistered,
            ));
        }

        let row = tables
            .pending
            .iter_mut()
            .find(|row| &row.id == pending && &row.account_id == id && row.is_active(at))
            .ok_or(RepositoryError::NotFound)?;
        row.consumed_at = Some(at);

        let account = tables
            .accounts
            .get_mut(id)
            .ok_or(RepositoryError::NotFound)?;
        account.registered_handle = Some(handle.to_string());
        account.registered_at = Some(at);
        Ok(account.clone())
    }

    fn reset_registration(&self, id: &AccountId, at: DateTime<Utc>) -> Result<(), RepositoryError> {
        let mut tables = self.lock()?;
        let account = tables
            .accounts
            .get_mut(id)
            .ok_or(RepositoryError::NotFound)?;
        account.registered_handle = None;
        account.registered_at = None;
        for row in tables
            .pending
            .iter_mut()
            .filter(|row| &row.account_id == id && row.consumed_at.is_none())
        {
            row.consumed_at = Some(at);
        }
        Ok(())
    }
}

impl SubmissionRepository for MemoryStore {
    fn insert(&self, submission: Submission) -> Result<Submission, RepositoryError> {
        let mut tables = self.lock()?;
        if !tables.stable_ids.insert(submission.content.stable_id.clone()) {
            return Err(RepositoryError::Conflict(Constraint::ContentStableId));
        }
        tables.submissions.insert(submission.id, submission.clone());
        Ok(submission)
    }

    fn modify<F>(&self, id: &SubmissionId, change: F) -> Result<Submission, RepositoryError>
    where
        F: FnOnce(&mut Submission) -> Result<(), RepositoryError>,
    {
        let mut tables = self.lock()?;
        let stored = tables
            .submissions
            .get_mut(id)
            .ok_or(RepositoryError::NotFound)?;
        let mut draft = stored.clone();
        change(&mut draft)?;
        *stored = draft.clone();
        Ok(draft)
    }

    fn fetch(&self, id: &SubmissionId) -> Result<Option<Submission>, RepositoryError> {
        Ok(self.lock()?.submissions.get(id).cloned())
    }

    fn contains_stable_id(&self, stable_id: &str) -> Result<bool, RepositoryError> {
        Ok(self.lock()?.stable_ids.contains(stable_id))
    }

    fn list(
        &self,
        tenant: &TenantId,
        query: &SubmissionQuery,
    ) -> Result<Vec<Submission>, RepositoryError> {
        let tables = self.lock()?;
        let mut rows: Vec<Submission> = tables
            .submissions
            .values()
            .filter(|submission| &submission.tenant_id == tenant && query.matches(submission))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows.truncate(query.limit);
        Ok(rows)
    }
}

impl GuildPolicyRepository for MemoryStore {
    fn policy(&self, tenant: &TenantId) -> Result<Option<GuildPolicy>, RepositoryError> {
        Ok(self.lock()?.policies.get(tenant).copied())
    }

    fn save_policy(&self, tenant: &TenantId, policy: GuildPolicy) -> Result<(), RepositoryError> {
        self.lock()?.policies.insert(tenant.clone(), policy);
        Ok(())
    }
}
