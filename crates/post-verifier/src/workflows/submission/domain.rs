use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::workflows::content::NormalizedContent;
use crate::workflows::registration::AccountId;
use crate::workflows::sentiment::Classification;

/// Isolated community scope owning policy and submissions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TenantId(pub String);

impl std::fmt::Display for TenantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubmissionId(pub Uuid);

impl SubmissionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Uuid::parse_str(raw.trim()).ok().map(Self)
    }
}

impl std::fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Actor recorded on automated decisions.
pub const SYSTEM_ACTOR: &str = "SYSTEM";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmissionStatus {
    PendingReview,
    Approved,
    Rejected,
}

impl SubmissionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SubmissionStatus::PendingReview => "PENDING_REVIEW",
            SubmissionStatus::Approved => "APPROVED",
            SubmissionStatus::Rejected => "REJECTED",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "PENDING_REVIEW" => Some(Self::PendingReview),
            "APPROVED" => Some(Self::Approved),
            "REJECTED" => Some(Self::Rejected),
            _ => None,
        }
    }
}

/// Per-tenant decision thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GuildPolicy {
    pub max_post_age_days: u32,
    pub sentiment_min_confidence: f64,
}

impl Default for GuildPolicy {
    fn default() -> Self {
        Self {
            max_post_age_days: 7,
            sentiment_min_confidence: 0.65,
        }
    }
}

/// Partial policy change; values are coerced into range rather than rejected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyUpdate {
    pub max_post_age_days: Option<f64>,
    pub sentiment_min_confidence: Option<f64>,
}

impl GuildPolicy {
    pub fn apply(&mut self, update: PolicyUpdate) {
        if let Some(days) = update.max_post_age_days.filter(|days| days.is_finite()) {
            self.max_post_age_days = days.floor().clamp(1.0, u32::MAX as f64) as u32;
        }
        if let Some(confidence) = update
            .sentiment_min_confidence
            .filter(|confidence| confidence.is_finite())
        {
            self.sentiment_min_confidence = confidence.clamp(0.0, 1.0);
        }
    }

    pub fn max_age_ms(&self) -> i64 {
        i64::from(self.max_post_age_days) * 24 * 60 * 60 * 1000
    }
}

/// Points sub-ledger. Either fully awarded or fully cleared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointsRecord {
    pub awarded: bool,
    pub amount: Option<i64>,
    pub currency: Option<String>,
    pub awarded_at: Option<DateTime<Utc>>,
    pub awarded_by: Option<String>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub id: SubmissionId,
    pub tenant_id: TenantId,
    pub account_id: AccountId,
    pub reference: String,
    pub content: NormalizedContent,
    pub classification: Classification,
    pub status: SubmissionStatus,
    pub decision_reason: String,
    pub decided_at: Option<DateTime<Utc>>,
    pub decided_by: Option<String>,
    pub points: PointsRecord,
    pub created_at: DateTime<Utc>,
}

impl Submission {
    pub fn receipt(&self) -> SubmissionReceipt {
        SubmissionReceipt {
            submission_id: self.id,
            status: self.status,
            reason: self.decision_reason.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionReceipt {
    pub submission_id: SubmissionId,
    pub status: SubmissionStatus,
    pub reason: String,
}

pub const MAX_LIST_LIMIT: usize = 50;

/// Listing filter for a tenant's submissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionQuery {
    pub status: Option<SubmissionStatus>,
    pub unawarded: bool,
    pub search: Option<String>,
    pub limit: usize,
}

impl Default for SubmissionQuery {
    fn default() -> Self {
        Self {
            status: None,
            unawarded: false,
            search: None,
            limit: MAX_LIST_LIMIT,
        }
    }
}

impl SubmissionQuery {
    pub fn matches(&self, submission: &Submission) -> bool {
        if let Some(status) = self.status {
            if submission.status != status {
                return false;
            }
        }
        if self.unawarded && submission.points.awarded {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => {
                let needle = term.to_lowercase();
                let content = &submission.content;
                content.url.to_lowercase().contains(&needle)
                    || content.owner_handle.to_lowercase().contains(&needle)
                    || content.text_content.to_lowercase().contains(&needle)
                    || submission.account_id.0.contains(term)
            }
            _ => true,
        }
    }
}
