//! Coerces generator output into tweet text and enforces the hard length limit.

use crate::services::llm::LlmOutput;

/// Structured reply keys that may carry the tweet, in priority order
const TEXT_KEYS: &[&str] = &["post", "text", "content", "tweet"];

/// Extract usable tweet text from a generator reply.
///
/// Returns `None` when there is no reply or nothing non-blank in it.
pub fn normalize_post_text(result: Option<&LlmOutput>) -> Option<String> {
    match result? {
        LlmOutput::PlainText(text) => non_blank(text),
        LlmOutput::StructuredFields(map) => TEXT_KEYS
            .iter()
            .filter_map(|key| map.get(*key).and_then(|v| v.as_str()))
            .find_map(non_blank),
    }
}

fn non_blank(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Truncate to `max_chars` characters, then strip trailing whitespace.
pub fn clamp(text: &str, max_chars: usize) -> String {
    let end = text
        .char_indices()
        .nth(max_chars)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len());
    text[..end].trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn structured(value: serde_json::Value) -> LlmOutput {
        match value {
            serde_json::Value::Object(map) => LlmOutput::StructuredFields(map),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_plain_text_is_trimmed() {
        let out = LlmOutput::PlainText("  sold the bottom again \n".into());
        assert_eq!(
            normalize_post_text(Some(&out)).as_deref(),
            Some("sold the bottom again")
        );
    }

    #[test]
    fn test_blank_and_missing_yield_none() {
        assert_eq!(normalize_post_text(None), None);
        assert_eq!(
            normalize_post_text(Some(&LlmOutput::PlainText("   ".into()))),
            None
        );
        assert_eq!(normalize_post_text(Some(&structured(json!({})))), None);
    }

    #[test]
    fn test_structured_key_priority() {
        let out = structured(json!({ "tweet": "third", "text": "second", "post": "" }));
        assert_eq!(normalize_post_text(Some(&out)).as_deref(), Some("second"));
    }

    #[test]
    fn test_non_string_fields_are_ignored() {
        let out = structured(json!({ "post": 42, "text": ["a"], "content": " real " }));
        assert_eq!(normalize_post_text(Some(&out)).as_deref(), Some("real"));

        let out = structured(json!({ "post": null, "reasoning": "no text here" }));
        assert_eq!(normalize_post_text(Some(&out)), None);
    }

    #[test]
    fn test_clamp_truncates_then_strips() {
        let text = format!("{} {}", "a".repeat(249), "b".repeat(10));
        let clamped = clamp(&text, 250);
        assert_eq!(clamped, "a".repeat(249));

        assert_eq!(clamp("short  ", 250), "short");
    }

    #[test]
    fn test_clamp_counts_characters() {
        let text = "é".repeat(300);
        let clamped = clamp(&text, 250);
        assert_eq!(clamped.chars().count(), 250);
    }
}
