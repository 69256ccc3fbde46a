use serde::{Deserialize, Serialize};
use serde_json::Value;
use tumae_upstream::envelope;

use super::{bool_field, int_field, text_field};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageSummary {
    pub id: Option<i64>,
    pub sender_id: Option<i64>,
    pub sender_name: Option<String>,
    pub receiver_id: Option<i64>,
    pub receiver_name: Option<String>,
    pub subject: String,
    pub body: String,
    pub created_at: Option<String>,
    pub is_read: bool,
    pub is_starred: bool,
}

impl MessageSummary {
    pub fn from_value(item: &Value) -> Self {
        Self {
            id: int_field(item, &["id", "message_id"]),
            sender_id: int_field(item, &["sender_id"]),
            sender_name: text_field(item, &["sender_name"]),
            receiver_id: int_field(item, &["receiver_id"]),
            receiver_name: text_field(item, &["receiver_name"]),
            subject: text_field(item, &["subject", "title"]).unwrap_or_default(),
            body: text_field(item, &["body", "content", "preview"]).unwrap_or_default(),
            created_at: text_field(item, &["created_at", "sent_at"]),
            is_read: bool_field(item, &["is_read", "read"]).unwrap_or(false),
            is_starred: bool_field(item, &["is_starred"]).unwrap_or(false),
        }
    }
}

/// Messages of an inbox or sent-box reply.
pub fn message_list(body: Value) -> Vec<MessageSummary> {
    envelope::extract_list(body)
        .iter()
        .filter(|item| item.is_object())
        .map(MessageSummary::from_value)
        .collect()
}
