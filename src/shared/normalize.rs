//! Conversion between the client-facing and stored shapes of tags and
//! subtasks.
//!
//! Nothing here rejects input: malformed pieces are repaired or dropped.

use serde_json::Value;

use crate::{subtask::Subtask, tags_input::TagsInput};

const TAG_SEPARATOR: &str = ", ";

/// Tags as they go into the `tags` column.
pub fn normalize_tags_in(tags: Option<&TagsInput>) -> Option<String> {
    let joined = match tags? {
        TagsInput::List(items) => items
            .iter()
            .filter_map(tag_text)
            .filter(|tag| !tag.is_empty())
            .collect::<Vec<_>>()
            .join(TAG_SEPARATOR),
        TagsInput::Joined(text) => text.trim().to_string(),
    };
    (!joined.is_empty()).then_some(joined)
}

// Scalars become their text; null, lists and objects are skipped.
fn tag_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Tags as the client sees them.
pub fn normalize_tags_out(stored: Option<&str>) -> Vec<String> {
    stored
        .map(|text| {
            text.split(',')
                .map(str::trim)
                .filter(|tag| !tag.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Clean a client-supplied subtask list.
///
/// Anything but a JSON array yields no subtasks. Elements whose `text`
/// (or, failing that, `title`) is blank are dropped. Missing ids become
/// `"{now_millis}-{index}"`, with `index` the element's position in `raw`.
pub fn normalize_subtasks_in(raw: &Value, now_millis: i64) -> Vec<Subtask> {
    let Some(items) = raw.as_array() else {
        return Vec::new();
    };

    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            let text = item
                .get("text")
                .and_then(Value::as_str)
                .or_else(|| item.get("title").and_then(Value::as_str))?
                .trim();
            if text.is_empty() {
                return None;
            }

            let id = item
                .get("id")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| format!("{now_millis}-{index}"));

            Some(Subtask {
                id,
                text: text.to_string(),
                completed: item.get("completed").is_some_and(is_truthy),
            })
        })
        .collect()
}

/// Subtasks as the client sees them. Accepts the JSONB array as stored, or
/// the same array serialized into a string by older writers.
pub fn normalize_subtasks_out(stored: &Value) -> Vec<Subtask> {
    match stored {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| serde_json::from_value(item.clone()).ok())
            .collect(),
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(parsed @ Value::Array(_)) => normalize_subtasks_out(&parsed),
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

// Loose boolean coercion for `completed`.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
