use serde_json::Value;

use super::classifier::ClassificationError;
use super::domain::{SentimentLabel, SentimentResult};

/// Clamps into [0, 1]; NaN maps to 0.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

/// Parses the whole reply as JSON, falling back to the first balanced `{...}` span.
pub fn extract_json(content: &str) -> Result<Value, ClassificationError> {
    if let Ok(value) = serde_json::from_str::<Value>(content.trim()) {
        return Ok(value);
    }

    first_balanced_object(content)
        .and_then(|span| serde_json::from_str::<Value>(span).ok())
        .ok_or(ClassificationError::InvalidJson)
}

/// First `{...}` span whose braces balance, skipping braces inside string literals.
fn first_balanced_object(content: &str) -> Option<&str> {
    let start = content.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in content[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&content[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Interprets a parsed payload. Unknown labels are errors; other fields degrade to defaults.
pub fn interpret(value: &Value) -> Result<SentimentResult, ClassificationError> {
    let label = match value.get("label") {
        Some(Value::String(raw)) => {
            SentimentLabel::parse(raw).ok_or_else(|| ClassificationError::InvalidLabel(raw.clone()))?
        }
        Some(other) => return Err(ClassificationError::InvalidLabel(other.to_string())),
        None => return Err(ClassificationError::InvalidLabel("<missing>".to_string())),
    };

    let confidence = clamp_unit(numeric(value.get("confidence")));
    let language = value
        .get("language")
        .and_then(Value::as_str)
        .filter(|language| !language.is_empty())
        .unwrap_or("unknown")
        .to_string();
    let rationale = value
        .get("rationale")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    Ok(SentimentResult {
        label,
        confidence,
        language,
        rationale,
    })
}

fn numeric(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(number)) => number.as_f64().unwrap_or(f64::NAN),
        Some(Value::String(raw)) => raw.trim().parse::<f64>().unwrap_or(f64::NAN),
        _ => f64::NAN,
    }
}
