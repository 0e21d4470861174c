//! Recursive pruning of empty values from a JSON-LD document.

use serde_json::{Map, Value};

/// Remove empty strings, nulls, empty objects and empty arrays.
///
/// Returns `None` when nothing meaningful is left. Numbers and booleans
/// always survive, including `0` and `false`. Array order and object key
/// order are preserved, and cleaning a cleaned value is a no-op.
pub fn clean(value: &Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::Array(items) => clean_array(items),
        Value::Object(map) => clean_object(map),
        other => Some(other.clone()),
    }
}

/// Clean a document, falling back to an empty object.
pub fn clean_or_empty(value: &Value) -> Value {
    clean(value).unwrap_or_else(|| Value::Object(Map::new()))
}

fn clean_array(items: &[Value]) -> Option<Value> {
    let cleaned: Vec<Value> = items.iter().filter_map(clean).collect();
    if cleaned.is_empty() {
        None
    } else {
        Some(Value::Array(cleaned))
    }
}

fn clean_object(map: &Map<String, Value>) -> Option<Value> {
    let mut cleaned = Map::new();
    for (key, value) in map {
        if let Some(v) = clean(value) {
            cleaned.insert(key.clone(), v);
        }
    }

    if cleaned.is_empty() {
        None
    } else {
        Some(Value::Object(cleaned))
    }
}
