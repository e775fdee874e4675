//! Ordered extraction rules over the extraction job's loosely versioned item shape.

use serde_json::Value;

use super::domain::{Bullish, NormalizedContent};

/// Prefix for stable ids synthesized from an internal post identifier.
pub const SYNTHESIZED_ID_PREFIX: &str = "cmc-community:post:";

/// Ordered JSON-pointer locations tried for one canonical field.
struct FieldRule {
    field: &'static str,
    paths: &'static [&'static str],
}

const STABLE_ID: FieldRule = FieldRule {
    field: "stableId",
    paths: &["/stableId"],
};
const INTERNAL_ID: FieldRule = FieldRule {
    field: "stableId",
    paths: &["/raw/id", "/raw/raw/gravityId", "/raw/raw/raw/gravityId"],
};
const URL: FieldRule = FieldRule {
    field: "url",
    paths: &["/source/url", "/raw/url", "/raw/raw/url"],
};
const OWNER_HANDLE: FieldRule = FieldRule {
    field: "owner.handle",
    paths: &["/raw/raw/owner/handle"],
};
const TEXT_CONTENT: FieldRule = FieldRule {
    field: "textContent",
    paths: &["/raw/raw/textContent", "/text"],
};
const POST_TIME: FieldRule = FieldRule {
    field: "postTime",
    paths: &["/raw/raw/postTime"],
};
const BULLISH: FieldRule = FieldRule {
    field: "bullish",
    paths: &["/raw/raw/raw/bullish", "/raw/raw/bullish"],
};

impl FieldRule {
    /// First location holding a non-null value.
    fn first_present<'a>(&self, item: &'a Value) -> Option<&'a Value> {
        self.paths
            .iter()
            .filter_map(|path| item.pointer(path))
            .find(|value| !value.is_null())
    }

    fn string(&self, item: &Value) -> Option<String> {
        self.first_present(item)
            .and_then(Value::as_str)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    }

    fn required_string(&self, item: &Value) -> Result<String, NormalizeError> {
        self.string(item).ok_or(NormalizeError::Missing(self.field))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizeError {
    #[error("missing {0}")]
    Missing(&'static str),
    #[error("invalid {field}: {value}")]
    Invalid { field: &'static str, value: String },
}

/// Reduces a raw extraction item to a canonical record, failing on the first missing field.
pub fn normalize(item: &Value) -> Result<NormalizedContent, NormalizeError> {
    let stable_id = match STABLE_ID.string(item) {
        Some(id) => id,
        None => INTERNAL_ID
            .string(item)
            .map(|id| format!("{SYNTHESIZED_ID_PREFIX}{id}"))
            .ok_or(NormalizeError::Missing(STABLE_ID.field))?,
    };
    let url = URL.required_string(item)?;
    let owner_handle = OWNER_HANDLE.required_string(item)?;
    let text_content = TEXT_CONTENT.required_string(item)?;
    let post_time_ms = post_time(item)?;
    let bullish = match BULLISH.first_present(item) {
        Some(Value::Bool(flag)) => Bullish::from(Some(*flag)),
        _ => Bullish::Absent,
    };

    Ok(NormalizedContent {
        stable_id,
        url,
        owner_handle,
        text_content,
        post_time_ms,
        bullish,
    })
}

fn post_time(item: &Value) -> Result<i64, NormalizeError> {
    let invalid = |value: &Value| NormalizeError::Invalid {
        field: POST_TIME.field,
        value: value.to_string(),
    };

    match POST_TIME.first_present(item) {
        Some(Value::String(raw)) if raw.is_empty() => Err(NormalizeError::Missing(POST_TIME.field)),
        Some(value @ Value::String(raw)) => raw.trim().parse::<i64>().map_err(|_| invalid(value)),
        Some(value @ Value::Number(number)) => number.as_i64().ok_or_else(|| invalid(value)),
        Some(other) => Err(invalid(other)),
        None => Err(NormalizeError::Missing(POST_TIME.field)),
    }
}
