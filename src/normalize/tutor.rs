use serde::{Deserialize, Serialize};
use serde_json::Value;
use tumae_upstream::envelope;

use super::{group_thousands, int_field, text_field};
use crate::catalog::{LookupTable, LESSON_TYPES, PURPOSES, SKILL_LEVELS, SUBJECT_NAMES};

/// A tutor as shown in match lists and rankings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TutorSummary {
    pub id: i64,
    pub name: String,
    pub subjects: Vec<String>,
    pub goals: Vec<String>,
    pub lesson_types: Vec<String>,
    pub regions: Vec<String>,
    pub skill_level: Option<String>,
    pub hourly_rate_min: Option<u64>,
    pub hourly_rate_max: Option<u64>,
    pub price_label: String,
    pub match_score: Option<f64>,
}

impl TutorSummary {
    /// `None` for entries the backend sent without an identifier.
    pub fn from_value(item: &Value) -> Option<Self> {
        let Some(id) = int_field(item, &["id", "tutor_id", "user_id"]) else {
            tracing::debug!(entry = %item, "dropping tutor without id");
            return None;
        };

        let rate_min = rate(item, "hourly_rate_min");
        let rate_max = rate(item, "hourly_rate_max");

        let mut subjects = display_names(item.get("subjects"), Some(&SUBJECT_NAMES), "과목");
        if subjects.is_empty() {
            subjects.push("과목 없음".to_string());
        }
        let mut goals = display_names(item.get("goals"), Some(&PURPOSES), "목적");
        if goals.is_empty() {
            goals.push("목적 없음".to_string());
        }

        let skill_level = match item.get("skill_level") {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(Value::Number(n)) => n
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .and_then(|n| SKILL_LEVELS.label_of(n))
                .map(str::to_string),
            _ => None,
        };

        Some(Self {
            id,
            name: text_field(item, &["name"]).unwrap_or_else(|| "이름 없음".to_string()),
            subjects,
            goals,
            lesson_types: display_names(item.get("lesson_types"), Some(&LESSON_TYPES), "수업 방식"),
            regions: display_names(item.get("regions"), None, "지역"),
            skill_level,
            hourly_rate_min: rate_min,
            hourly_rate_max: rate_max,
            price_label: price_label(rate_min, rate_max),
            match_score: item.get("match_score").and_then(Value::as_f64),
        })
    }
}

/// Tutors of a list reply; entries without an id are dropped.
pub fn tutor_list(body: Value) -> Vec<TutorSummary> {
    envelope::extract_list(body)
        .iter()
        .filter_map(TutorSummary::from_value)
        .collect()
}

/// Price text for an hourly range; zero counts as unset.
pub fn price_label(min: Option<u64>, max: Option<u64>) -> String {
    match (min.filter(|n| *n > 0), max.filter(|n| *n > 0)) {
        (None, None) => "가격 협의".to_string(),
        (Some(min), Some(max)) => {
            format!("시간 당 {} ~ {}", group_thousands(min), group_thousands(max))
        }
        (Some(min), None) => format!("시간 당 {} 이상", group_thousands(min)),
        (None, Some(max)) => format!("시간 당 {} 이하", group_thousands(max)),
    }
}

fn rate(item: &Value, key: &str) -> Option<u64> {
    int_field(item, &[key]).and_then(|n| u64::try_from(n).ok())
}

/// Strings are kept as sent; numbers go through `names` with a `"<kind> #n"`
/// fallback.
fn display_names(value: Option<&Value>, names: Option<&LookupTable>, kind: &str) -> Vec<String> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => {
                let label = n
                    .as_u64()
                    .and_then(|id| u32::try_from(id).ok())
                    .and_then(|id| names.and_then(|table| table.label_of(id)));
                Some(match label {
                    Some(label) => label.to_string(),
                    None => format!("{kind} #{n}"),
                })
            }
            Value::Null => None,
            Value::String(_) => None,
            other => Some(other.to_string()),
        })
        .collect()
}
