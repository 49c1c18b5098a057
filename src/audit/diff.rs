//! Field diffs for edit entries
//!
//! Produces the human-readable `activityDetail` of an edit: one
//! `field: old -> new` clause per changed top-level field.

use serde_json::Value;

use crate::models::Fields;

/// Longest string value shown before truncation
const MAX_SHOWN_CHARS: usize = 50;

/// Describe the top-level field changes between two record states
///
/// Fields named in `redacted` are reported as changed without their values.
/// Returns `None` when nothing changed.
pub fn generate_diff(before: &Fields, after: &Fields, redacted: &[&str]) -> Option<String> {
    let mut changes = Vec::new();
    let shown = |key: &str, value: &Value| {
        if redacted.contains(&key) {
            "***".to_string()
        } else {
            format_value(value)
        }
    };

    for (key, before_val) in before {
        match after.get(key) {
            Some(after_val) if after_val != before_val => {
                if redacted.contains(&key.as_str()) {
                    changes.push(format!("{}: (changed)", key));
                } else {
                    changes.push(format!(
                        "{}: {} -> {}",
                        key,
                        format_value(before_val),
                        format_value(after_val)
                    ));
                }
            }
            Some(_) => {}
            None => changes.push(format!("{}: {} -> (removed)", key, shown(key, before_val))),
        }
    }

    for (key, after_val) in after {
        if !before.contains_key(key) {
            changes.push(format!("{}: (added) -> {}", key, shown(key, after_val)));
        }
    }

    if changes.is_empty() {
        None
    } else {
        Some(changes.join(", "))
    }
}

/// Format a JSON value for human-readable display
fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => {
            if s.chars().count() > MAX_SHOWN_CHARS {
                let head: String = s.chars().take(MAX_SHOWN_CHARS - 3).collect();
                format!("\"{}...\"", head)
            } else {
                format!("\"{}\"", s)
            }
        }
        Value::Array(arr) => format!("[{} items]", arr.len()),
        Value::Object(obj) => format!("{{{} fields}}", obj.len()),
    }
}
