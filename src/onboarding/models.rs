use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

/// Which side of the marketplace is onboarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Tutor,
    Student,
}

impl Role {
    /// Accepted hourly price bounds, in won.
    pub fn price_range(&self) -> RangeInclusive<u32> {
        match self {
            Role::Tutor => 20_000..=50_000,
            Role::Student => 10_000..=300_000,
        }
    }

    /// Backend resource that stores the onboarding details.
    pub fn details_path(&self) -> &'static str {
        match self {
            Role::Tutor => "/auth/tutors/details",
            Role::Student => "/auth/students/details",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Tutor => "tutor",
            Role::Student => "student",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "tutor" => Ok(Role::Tutor),
            "student" => Ok(Role::Student),
            other => Err(format!("unknown role '{other}'; expected tutor or student")),
        }
    }
}

/// A number that clients send either as JSON number or as text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Int(i64),
    Text(String),
}

impl Scalar {
    pub fn to_text(&self) -> String {
        match self {
            Scalar::Int(n) => n.to_string(),
            Scalar::Text(s) => s.trim().to_string(),
        }
    }

    /// Positive identifier, if this scalar holds one.
    pub fn as_id(&self) -> Option<u64> {
        match self {
            Scalar::Int(n) => u64::try_from(*n).ok().filter(|n| *n > 0),
            Scalar::Text(s) => s.trim().parse::<u64>().ok().filter(|n| *n > 0),
        }
    }
}

/// Raw onboarding form: option labels exactly as the user picked them.
///
/// Field aliases accept the camelCase names used by the web forms.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OnboardingSelection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Scalar>,
    #[serde(default)]
    pub subjects: Vec<String>,
    #[serde(default, alias = "purpose", alias = "purposes")]
    pub goals: Vec<String>,
    #[serde(default, alias = "teachingMethod")]
    pub lesson_types: Vec<String>,
    #[serde(default, alias = "levels")]
    pub skill_levels: Vec<String>,
    #[serde(default)]
    pub days: Vec<String>,
    #[serde(default, alias = "timeSlots")]
    pub time_slots: Vec<String>,
    #[serde(default)]
    pub regions: Vec<String>,
    #[serde(default, alias = "minPrice")]
    pub price_min: Option<Scalar>,
    #[serde(default, alias = "maxPrice")]
    pub price_max: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub education: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectSkill {
    pub subject_id: u32,
    pub skill_level_id: u32,
}

/// One bookable (weekday, time band) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    pub weekday: u8,
    pub time_band_id: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TutorOnboarding {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<u64>,
    pub tutor_subjects: Vec<SubjectSkill>,
    pub tutor_goals: Vec<u32>,
    pub tutor_lesson_types: Vec<u32>,
    pub tutor_availabilities: Vec<Availability>,
    pub tutor_regions: Vec<u32>,
    pub hourly_rate_min: u32,
    pub hourly_rate_max: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub education: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentOnboarding {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<u64>,
    pub student_subjects: Vec<SubjectSkill>,
    pub student_goals: Vec<u32>,
    pub student_lesson_types: Vec<u32>,
    pub student_availabilities: Vec<Availability>,
    pub student_regions: Vec<u32>,
    pub budget_min: u32,
    pub budget_max: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub education: Option<String>,
}

/// Submission body sent once to the backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OnboardingPayload {
    Tutor(TutorOnboarding),
    Student(StudentOnboarding),
}

/// A single rejected form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub error: String,
}
