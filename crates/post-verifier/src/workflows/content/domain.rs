use serde::{Deserialize, Serialize};

/// Author-stated direction attached to a post. Absence is meaningful and routes to review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bullish {
    Yes,
    No,
    Absent,
}

impl Bullish {
    pub fn as_option(self) -> Option<bool> {
        match self {
            Bullish::Yes => Some(true),
            Bullish::No => Some(false),
            Bullish::Absent => None,
        }
    }
}

impl From<Option<bool>> for Bullish {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(true) => Bullish::Yes,
            Some(false) => Bullish::No,
            None => Bullish::Absent,
        }
    }
}

/// Canonical, fully validated view of a remote post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedContent {
    pub stable_id: String,
    pub url: String,
    pub owner_handle: String,
    pub text_content: String,
    pub post_time_ms: i64,
    pub bullish: Bullish,
}
