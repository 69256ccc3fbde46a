//! Canonical shapes for backend replies.
//!
//! The backend has answered the same resource with differently named fields
//! and differently nested lists over time. Handlers and the client only see
//! the types defined here; field aliases and fallbacks are resolved once.

mod message;
mod resume;
mod tutor;

pub use message::{message_list, MessageSummary};
pub use resume::{resume_blocks, ResumeBlock, BLOCK_GROUPS};
pub use tutor::{price_label, tutor_list, TutorSummary};

use serde_json::Value;

/// First of `keys` holding an integer, or a string that parses as one.
pub(crate) fn int_field(item: &Value, keys: &[&str]) -> Option<i64> {
    keys.iter().find_map(|key| match item.get(*key)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// First of `keys` holding a non-empty string.
pub(crate) fn text_field(item: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| {
        item.get(*key)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string)
    })
}

/// First of `keys` holding a boolean.
pub(crate) fn bool_field(item: &Value, keys: &[&str]) -> Option<bool> {
    keys.iter().find_map(|key| item.get(*key).and_then(Value::as_bool))
}

/// `20000` → `"20,000"`.
pub(crate) fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fields_accept_aliases_in_order() {
        let item = json!({"message_id": "41", "content": "", "preview": "hi", "read": true});
        assert_eq!(int_field(&item, &["id", "message_id"]), Some(41));
        assert_eq!(text_field(&item, &["body", "content", "preview"]).as_deref(), Some("hi"));
        assert_eq!(bool_field(&item, &["is_read", "read"]), Some(true));
        assert_eq!(int_field(&item, &["id"]), None);
    }

    #[test]
    fn thousands_are_grouped() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(20000), "20,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
    }
}
