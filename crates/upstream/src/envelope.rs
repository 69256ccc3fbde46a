//! The backend wraps replies as `{message, data}` on success and
//! `{message | detail}` on failure, and list endpoints have been seen to answer
//! with several shapes. Everything that looks inside a backend body goes
//! through here.

use serde_json::Value;

/// Keys under which list endpoints have been observed to nest their items.
pub const LIST_KEYS: &[&str] = &["data", "tutors", "results", "messages"];

/// The `data` member of an envelope, when present and non-null.
pub fn data(body: &Value) -> Option<&Value> {
    body.get("data").filter(|data| !data.is_null())
}

/// Take the `data` member out of an envelope, or hand the body back unchanged.
pub fn unwrap_data(body: Value) -> Value {
    match body {
        Value::Object(mut map) => match map.remove("data") {
            Some(data) if !data.is_null() => data,
            Some(data) => {
                map.insert("data".to_string(), data);
                Value::Object(map)
            }
            None => Value::Object(map),
        },
        other => other,
    }
}

/// Extract the items of a list reply.
///
/// A bare array is used as-is; otherwise the first of [`LIST_KEYS`] holding an
/// array wins. Any other shape yields an empty list.
pub fn extract_list(body: Value) -> Vec<Value> {
    match body {
        Value::Array(items) => items,
        Value::Object(mut map) => {
            for key in LIST_KEYS {
                if let Some(Value::Array(items)) = map.remove(*key) {
                    return items;
                }
            }
            tracing::warn!(
                target: "tumae-upstream",
                keys = ?map.keys().collect::<Vec<_>>(),
                "unrecognised list reply shape"
            );
            Vec::new()
        }
        other => {
            tracing::warn!(target: "tumae-upstream", body = %other, "unrecognised list reply shape");
            Vec::new()
        }
    }
}

/// Human-readable message carried by an error body, if any.
///
/// Understands validation `detail` arrays (`[{loc, msg}]`), a plain `detail`
/// string, a top-level `message`, and the gateway's own `{error: {message}}`.
pub fn error_message(body: &Value) -> Option<String> {
    match body.get("detail") {
        Some(Value::Array(items)) if !items.is_empty() => {
            let parts: Vec<String> = items.iter().map(describe_detail).collect();
            return Some(parts.join(", "));
        }
        Some(Value::String(detail)) => return Some(detail.clone()),
        _ => {}
    }

    if let Some(Value::String(message)) = body.get("message") {
        return Some(message.clone());
    }

    body.get("error")
        .and_then(|error| error.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn describe_detail(item: &Value) -> String {
    match item {
        Value::String(text) => text.clone(),
        Value::Object(_) => match item.get("msg").and_then(Value::as_str) {
            Some(msg) => {
                let loc = item
                    .get("loc")
                    .and_then(Value::as_array)
                    .map(|parts| {
                        parts
                            .iter()
                            .map(|part| match part {
                                Value::String(s) => s.clone(),
                                other => other.to_string(),
                            })
                            .collect::<Vec<_>>()
                            .join(".")
                    })
                    .unwrap_or_default();
                format!("{loc}: {msg}")
            }
            None => item.to_string(),
        },
        other => other.to_string(),
    }
}
