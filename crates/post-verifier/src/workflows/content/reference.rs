use regex::Regex;
use std::sync::OnceLock;

fn post_url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)coinmarketcap\.com/community/post/(\d+)").expect("static pattern compiles")
    })
}

/// Reduces a community post URL to its numeric id; anything else passes through trimmed.
pub fn extract_post_reference(input: &str) -> String {
    let trimmed = input.trim();
    post_url_pattern()
        .captures(trimmed)
        .and_then(|captures| captures.get(1))
        .map(|id| id.as_str().to_string())
        .unwrap_or_else(|| trimmed.to_string())
}
