//! Human-readable message selection for failed calls.
//!
//! Extractors run in order over the decoded error body; the first one that
//! yields a non-empty string wins. When none does (or the body is not JSON,
//! or there was no response at all) the caller's fallback is used.

use serde_json::Value;

type Extractor = fn(&Value) -> Option<&str>;

/// Priority order: backend `error`, then backend `message`.
const EXTRACTORS: &[Extractor] = &[error_field, message_field];

fn error_field(body: &Value) -> Option<&str> {
    body.get("error").and_then(Value::as_str)
}

fn message_field(body: &Value) -> Option<&str> {
    body.get("message").and_then(Value::as_str)
}

/// Pick the message for an error body, or `fallback`.
pub fn extract(body: Option<&str>, fallback: &str) -> String {
    body.and_then(|raw| serde_json::from_str::<Value>(raw).ok())
        .and_then(|value| {
            EXTRACTORS
                .iter()
                .filter_map(|extractor| extractor(&value))
                .find(|msg| !msg.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| fallback.to_string())
}
