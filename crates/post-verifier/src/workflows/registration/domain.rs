use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque platform user identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountId(pub String);

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub registered_handle: Option<String>,
    pub registered_at: Option<DateTime<Utc>>,
}

impl Account {
    pub fn new(id: AccountId) -> Self {
        Self {
            id,
            registered_handle: None,
            registered_at: None,
        }
    }

    pub fn is_registered(&self) -> bool {
        self.registered_handle.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PendingId(pub Uuid);

impl PendingId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

/// How long an issued code stays redeemable.
pub const CODE_TTL_HOURS: i64 = 12;

/// One issued verification code. Superseded or consumed rows stay inert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRegistration {
    pub id: PendingId,
    pub account_id: AccountId,
    pub requested_handle: String,
    pub code: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub consumed_at: Option<DateTime<Utc>>,
}

impl PendingRegistration {
    pub fn issue(
        account_id: AccountId,
        requested_handle: String,
        code: String,
        issued_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: PendingId::generate(),
            account_id,
            requested_handle,
            code,
            issued_at,
            expires_at: issued_at + Duration::hours(CODE_TTL_HOURS),
            consumed_at: None,
        }
    }

    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.consumed_at.is_none() && self.expires_at > now
    }
}

/// Code handed back to the caller after `register`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuedCode {
    pub handle: String,
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

impl From<&PendingRegistration> for IssuedCode {
    fn from(pending: &PendingRegistration) -> Self {
        Self {
            handle: pending.requested_handle.clone(),
            code: pending.code.clone(),
            expires_at: pending.expires_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifiedHandle {
    pub handle: String,
    pub registered_at: DateTime<Utc>,
}
