//! Decision engine: precondition checks plus the bullish/sentiment decision table.

use chrono::{DateTime, Utc};

use super::domain::{GuildPolicy, SubmissionStatus};
use crate::workflows::content::{Bullish, NormalizedContent};
use crate::workflows::sentiment::{SentimentLabel, SentimentResult};

/// Hard rejections evaluated before classification.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PreconditionFailure {
    #[error("post author handle is {found}, but you are registered as {expected}")]
    HandleMismatch { found: String, expected: String },
    #[error("post is older than {max_days} days")]
    TooOld { max_days: u32 },
    #[error("this post has already been submitted")]
    Duplicate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub status: SubmissionStatus,
    pub reason: String,
}

pub fn check_owner(content: &NormalizedContent, registered_handle: &str) -> Result<(), PreconditionFailure> {
    if content.owner_handle == registered_handle {
        Ok(())
    } else {
        Err(PreconditionFailure::HandleMismatch {
            found: content.owner_handle.clone(),
            expected: registered_handle.to_string(),
        })
    }
}

pub fn check_age(
    policy: &GuildPolicy,
    content: &NormalizedContent,
    now: DateTime<Utc>,
) -> Result<(), PreconditionFailure> {
    let age_ms = now.timestamp_millis().saturating_sub(content.post_time_ms);
    if age_ms > policy.max_age_ms() {
        Err(PreconditionFailure::TooOld {
            max_days: policy.max_post_age_days,
        })
    } else {
        Ok(())
    }
}

/// Maps the bullish flag and classifier output onto a status and audit reason.
pub fn decide(policy: &GuildPolicy, bullish: Bullish, sentiment: &SentimentResult) -> Decision {
    match bullish {
        Bullish::Absent => Decision {
            status: SubmissionStatus::PendingReview,
            reason: "Bullish flag missing; requires manual review.".to_string(),
        },
        Bullish::No => Decision {
            status: SubmissionStatus::Rejected,
            reason: "Bullish flag is false.".to_string(),
        },
        Bullish::Yes
            if sentiment.label == SentimentLabel::Positive
                && sentiment.confidence >= policy.sentiment_min_confidence =>
        {
            Decision {
                status: SubmissionStatus::Approved,
                reason: "Auto-approved: bullish=true and positive sentiment.".to_string(),
            }
        }
        Bullish::Yes => Decision {
            status: SubmissionStatus::PendingReview,
            reason: format!(
                "Requires review: bullish=true but sentiment={} (conf={:.2}).",
                sentiment.label, sentiment.confidence
            ),
        },
    }
}
