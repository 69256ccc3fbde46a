use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{int_field, text_field};

/// Block groups of a grouped resume reply, in display order.
pub const BLOCK_GROUPS: [&str; 4] = ["career", "project", "certificate", "portfolio"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeBlock {
    pub id: Option<i64>,
    pub block_type: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tech_stack: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acquired_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_url: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl ResumeBlock {
    fn from_value(item: &Value, block_type: Option<&str>) -> Self {
        let block_type = block_type
            .map(str::to_string)
            .or_else(|| text_field(item, &["block_type"]))
            .unwrap_or_default();

        Self {
            id: int_field(item, &["id", "block_id"]),
            block_type,
            title: text_field(item, &["title"]).unwrap_or_default(),
            period: text_field(item, &["period"]),
            role: text_field(item, &["role"]),
            description: text_field(item, &["description"]),
            tech_stack: text_field(item, &["tech_stack"]),
            issuer: text_field(item, &["issuer"]),
            acquired_at: text_field(item, &["acquired_at"]),
            file_url: text_field(item, &["file_url"]),
            link_url: text_field(item, &["link_url"]),
            created_at: text_field(item, &["created_at"]),
            updated_at: text_field(item, &["updated_at"]),
        }
    }
}

/// Flatten a resume reply into blocks.
///
/// A grouped object takes each block's type from its group; a flat array
/// keeps the type each block carries.
pub fn resume_blocks(body: Value) -> Vec<ResumeBlock> {
    match &body {
        Value::Array(items) => items
            .iter()
            .filter(|item| item.is_object())
            .map(|item| ResumeBlock::from_value(item, None))
            .collect(),
        Value::Object(map) if BLOCK_GROUPS.iter().any(|group| map.contains_key(*group)) => {
            BLOCK_GROUPS
                .iter()
                .filter_map(|group| match map.get(*group) {
                    Some(Value::Array(items)) => Some((*group, items)),
                    _ => None,
                })
                .flat_map(|(group, items)| {
                    items
                        .iter()
                        .map(move |item| ResumeBlock::from_value(item, Some(group)))
                })
                .collect()
        }
        other => {
            tracing::warn!(body = %other, "unrecognised resume reply shape");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn grouped_reply_is_flattened_in_group_order() {
        let blocks = resume_blocks(json!({
            "portfolio": [{"id": 9, "title": "블로그", "link_url": "https://example.com"}],
            "career": [{"id": 1, "title": "백엔드 개발", "period": "2021-2023"}],
            "certificate": [],
            "project": [{"id": 4, "title": "매칭 서비스", "tech_stack": "Rust"}]
        }));

        let summary: Vec<(&str, Option<i64>)> = blocks
            .iter()
            .map(|b| (b.block_type.as_str(), b.id))
            .collect();
        assert_eq!(
            summary,
            vec![("career", Some(1)), ("project", Some(4)), ("portfolio", Some(9))]
        );
        assert_eq!(blocks[1].tech_stack.as_deref(), Some("Rust"));
    }

    #[test]
    fn flat_reply_keeps_block_types() {
        let blocks = resume_blocks(json!([
            {"id": 2, "block_type": "certificate", "title": "정보처리기사", "issuer": "산업인력공단"}
        ]));
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].block_type, "certificate");
        assert_eq!(blocks[0].issuer.as_deref(), Some("산업인력공단"));
    }

    #[test]
    fn unknown_shape_is_empty() {
        assert!(resume_blocks(json!({"message": "SUCCESS"})).is_empty());
        assert!(resume_blocks(Value::Null).is_empty());
    }
}
