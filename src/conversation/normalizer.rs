//! Conversation normalization
//!
//! Validates raw participant and message records from a chat export and
//! canonicalizes them into a time-ordered working set. Malformed records are
//! dropped rather than reported.

use crate::conversation::types::NormalizedMessage;
use serde_json::Value;

/// Maximum number of participants taken from a conversation
pub const MAX_PARTICIPANTS: usize = 2;

/// Normalizer for chat export conversations
pub struct ConversationNormalizer;

impl ConversationNormalizer {
    /// Extract up to two distinct, non-blank participant names.
    ///
    /// Non-array input yields an empty list.
    pub fn normalize_participants(raw: Option<&Value>) -> Vec<String> {
        let Some(records) = raw.and_then(Value::as_array) else {
            return Vec::new();
        };

        let mut names: Vec<String> = Vec::with_capacity(MAX_PARTICIPANTS);
        for name in records
            .iter()
            .filter_map(|record| record.get("name").and_then(Value::as_str))
        {
            if names.len() == MAX_PARTICIPANTS {
                break;
            }
            if name.trim().is_empty() || names.iter().any(|existing| existing == name) {
                continue;
            }
            names.push(name.to_string());
        }
        names
    }

    /// Keep messages sent by an accepted participant with a usable timestamp,
    /// sorted by timestamp (stable for equal timestamps).
    pub fn normalize_messages(raw: Option<&Value>, accepted: &[String]) -> Vec<NormalizedMessage> {
        let Some(records) = raw.and_then(Value::as_array) else {
            return Vec::new();
        };

        let mut messages: Vec<NormalizedMessage> = records
            .iter()
            .filter_map(|record| normalize_message(record, accepted))
            .collect();

        // sort_by_key is stable
        messages.sort_by_key(|message| message.timestamp_ms);
        messages
    }
}

fn normalize_message(record: &Value, accepted: &[String]) -> Option<NormalizedMessage> {
    let sender = record.get("sender_name").and_then(Value::as_str)?;
    if !accepted.iter().any(|name| name == sender) {
        return None;
    }

    let timestamp_ms = coerce_timestamp(record.get("timestamp_ms")?)?;
    let content = record
        .get("content")
        .and_then(Value::as_str)
        .map(str::to_string);

    Some(NormalizedMessage {
        sender: sender.to_string(),
        timestamp_ms,
        content,
    })
}

/// Coerce a raw timestamp into integer milliseconds.
///
/// Follows numeric coercion of loosely typed exports: `null` and blank
/// strings are 0, booleans are 0 or 1, numeric strings are parsed and
/// fractional values are floored. Arrays, objects, non-numeric strings,
/// non-finite and out-of-range values yield `None`.
pub(crate) fn coerce_timestamp(value: &Value) -> Option<i64> {
    match value {
        Value::Null => Some(0),
        Value::Bool(flag) => Some(i64::from(*flag)),
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().and_then(float_to_millis)),
        Value::String(text) => {
            let text = text.trim();
            if text.is_empty() {
                return Some(0);
            }
            text.parse::<i64>()
                .ok()
                .or_else(|| text.parse::<f64>().ok().and_then(float_to_millis))
        }
        _ => None,
    }
}

fn float_to_millis(value: f64) -> Option<i64> {
    if !value.is_finite() {
        return None;
    }
    let floored = value.floor();
    if floored < i64::MIN as f64 || floored >= i64::MAX as f64 {
        return None;
    }
    Some(floored as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn accepted() -> Vec<String> {
        vec!["Alice".to_string(), "Bob".to_string()]
    }

    #[test]
    fn test_participants_first_two_valid_names() {
        let raw = json!([
            { "name": "Alice" },
            { "name": "   " },
            { "name": 42 },
            {},
            "not an object",
            { "name": "Bob" },
            { "name": "Carol" }
        ]);

        assert_eq!(
            ConversationNormalizer::normalize_participants(Some(&raw)),
            vec!["Alice", "Bob"]
        );
    }

    #[test]
    fn test_participants_are_distinct() {
        let raw = json!([{ "name": "Alice" }, { "name": "Alice" }, { "name": "Bob" }]);
        assert_eq!(
            ConversationNormalizer::normalize_participants(Some(&raw)),
            vec!["Alice", "Bob"]
        );

        let raw = json!([{ "name": "Alice" }, { "name": "Alice" }]);
        assert_eq!(
            ConversationNormalizer::normalize_participants(Some(&raw)),
            vec!["Alice"]
        );
    }

    #[test]
    fn test_participants_non_array_is_empty() {
        assert!(ConversationNormalizer::normalize_participants(None).is_empty());
        let object = json!({ "name": "A" });
        assert!(ConversationNormalizer::normalize_participants(Some(&object)).is_empty());
        assert!(ConversationNormalizer::normalize_participants(Some(&json!("Alice"))).is_empty());
    }

    #[test]
    fn test_messages_filter_unknown_senders_and_bad_timestamps() {
        let raw = json!([
            { "sender_name": "Alice", "timestamp_ms": 1000, "content": "hi" },
            { "sender_name": "Mallory", "timestamp_ms": 1500, "content": "intruder" },
            { "sender_name": "alice", "timestamp_ms": 1600 },
            { "sender_name": "Bob", "timestamp_ms": "not a number" },
            { "sender_name": "Bob", "timestamp_ms": [2000] },
            { "sender_name": "Bob", "timestamp_ms": { "ms": 2000 } },
            { "sender_name": "Bob" },
            { "sender_name": "Bob", "timestamp_ms": "2000", "content": { "photo": "x.jpg" } }
        ]);

        let messages = ConversationNormalizer::normalize_messages(Some(&raw), &accepted());
        assert_eq!(
            messages,
            vec![
                NormalizedMessage {
                    sender: "Alice".to_string(),
                    timestamp_ms: 1000,
                    content: Some("hi".to_string()),
                },
                NormalizedMessage {
                    sender: "Bob".to_string(),
                    timestamp_ms: 2000,
                    content: None,
                },
            ]
        );
    }

    #[test]
    fn test_messages_sorted_with_stable_ties() {
        // Chat exports list newest first
        let raw = json!([
            { "sender_name": "Bob", "timestamp_ms": 3000, "content": "third" },
            { "sender_name": "Alice", "timestamp_ms": 2000, "content": "tie-a" },
            { "sender_name": "Bob", "timestamp_ms": 2000, "content": "tie-b" },
            { "sender_name": "Alice", "timestamp_ms": 1000, "content": "first" }
        ]);

        let contents: Vec<_> = ConversationNormalizer::normalize_messages(Some(&raw), &accepted())
            .into_iter()
            .map(|m| m.content.unwrap())
            .collect();
        assert_eq!(contents, vec!["first", "tie-a", "tie-b", "third"]);
    }

    #[test]
    fn test_messages_non_array_is_empty() {
        assert!(ConversationNormalizer::normalize_messages(None, &accepted()).is_empty());
        assert!(
            ConversationNormalizer::normalize_messages(Some(&json!({"a": 1})), &accepted())
                .is_empty()
        );
    }

    #[test]
    fn test_coerce_timestamp() {
        assert_eq!(coerce_timestamp(&json!(1700000000000i64)), Some(1700000000000));
        assert_eq!(coerce_timestamp(&json!(1500.9)), Some(1500));
        assert_eq!(coerce_timestamp(&json!(" 42 ")), Some(42));
        assert_eq!(coerce_timestamp(&json!("42.5")), Some(42));
        assert_eq!(coerce_timestamp(&json!("NaN")), None);
        assert_eq!(coerce_timestamp(&json!("inf")), None);
        assert_eq!(coerce_timestamp(&json!("12abc")), None);
        assert_eq!(coerce_timestamp(&json!([1])), None);
        assert_eq!(coerce_timestamp(&json!({})), None);
        assert_eq!(coerce_timestamp(&json!(u64::MAX)), None);
    }

    #[test]
    fn test_coerce_timestamp_loose_values() {
        assert_eq!(coerce_timestamp(&json!(null)), Some(0));
        assert_eq!(coerce_timestamp(&json!("")), Some(0));
        assert_eq!(coerce_timestamp(&json!("   ")), Some(0));
        assert_eq!(coerce_timestamp(&json!(true)), Some(1));
        assert_eq!(coerce_timestamp(&json!(false)), Some(0));
    }

    #[test]
    fn test_messages_keep_loosely_typed_timestamps() {
        let raw = json!([
            { "sender_name": "Alice", "timestamp_ms": 5, "content": "five" },
            { "sender_name": "Bob", "timestamp_ms": true, "content": "one" },
            { "sender_name": "Alice", "timestamp_ms": null, "content": "zero" },
            { "sender_name": "Bob", "timestamp_ms": "", "content": "blank" }
        ]);

        let contents: Vec<_> = ConversationNormalizer::normalize_messages(Some(&raw), &accepted())
            .into_iter()
            .map(|m| (m.timestamp_ms, m.content.unwrap()))
            .collect();
        assert_eq!(
            contents,
            vec![
                (0, "zero".to_string()),
                (0, "blank".to_string()),
                (1, "one".to_string()),
                (5, "five".to_string()),
            ]
        );
    }
}
