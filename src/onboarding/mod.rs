//! Onboarding aggregation: turn the labels picked in an onboarding form into
//! the identifier payload the backend stores.
//!
//! Aggregation is pure. It either yields a complete payload or the full list
//! of rejected fields, so a caller can report every problem at once without
//! having touched the network.

pub mod models;

use serde_json::json;
use tumae_http::error::AppError;

use crate::catalog::{self, LESSON_TYPES, PURPOSES, SKILL_LEVELS, SUBJECTS};

pub use models::{
    Availability, FieldError, OnboardingPayload, OnboardingSelection, Role, Scalar,
    StudentOnboarding, SubjectSkill, TutorOnboarding,
};

/// Every day × slot pair, day-major.
///
/// Unknown day labels are skipped; unknown slot labels become time band `0`.
pub fn availabilities<D, S>(days: D, slots: S) -> Vec<Availability>
where
    D: IntoIterator,
    D::Item: AsRef<str>,
    S: IntoIterator,
    S::Item: AsRef<str>,
{
    let bands: Vec<u32> = slots
        .into_iter()
        .map(|slot| catalog::time_band_id(slot.as_ref()))
        .collect();

    days.into_iter()
        .filter_map(|day| {
            let weekday = catalog::weekday_index(day.as_ref());
            if weekday.is_none() {
                tracing::debug!(day = day.as_ref(), "skipping unknown day label");
            }
            weekday
        })
        .flat_map(|weekday| {
            bands.iter().map(move |&time_band_id| Availability {
                weekday,
                time_band_id,
            })
        })
        .collect()
}

/// Rejected fields of one onboarding form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    fn push(&mut self, field: &'static str, error: impl Into<String>) {
        self.0.push(FieldError {
            field,
            error: error.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.iter().map(|e| e.field)
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|e| format!("{}: {}", e.field, e.error))
            .collect();
        f.write_str(&parts.join(", "))
    }
}

impl std::error::Error for ValidationErrors {}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let details = errors
            .0
            .iter()
            .map(|e| json!({"field": e.field, "error": e.error}))
            .collect();
        AppError::validation(details, "onboarding selection is incomplete")
    }
}

/// Build the backend payload for `role` from a raw selection.
pub fn aggregate(
    role: Role,
    selection: &OnboardingSelection,
) -> Result<OnboardingPayload, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let subject_ids = SUBJECTS.map_labels(selection.subjects.iter().map(String::as_str));
    if subject_ids.is_empty() {
        errors.push("subjects", "select at least one subject");
    }

    let lesson_types = LESSON_TYPES.map_labels(selection.lesson_types.iter().map(String::as_str));
    if lesson_types.is_empty() {
        errors.push("lesson_types", "select at least one lesson type");
    }

    let skill_level = SKILL_LEVELS
        .map_labels(selection.skill_levels.iter().map(String::as_str))
        .first()
        .copied();
    if skill_level.is_none() {
        errors.push("skill_levels", "select a skill level");
    }

    let range = role.price_range();
    let price_min = parse_price("price_min", selection.price_min.as_ref(), &mut errors);
    let price_max = parse_price("price_max", selection.price_max.as_ref(), &mut errors);

    for (field, price) in [("price_min", price_min), ("price_max", price_max)] {
        if let Some(price) = price {
            if !range.contains(&price) {
                errors.push(
                    field,
                    format!(
                        "must be between {} and {}",
                        range.start(),
                        range.end()
                    ),
                );
            }
        }
    }

    if let (Some(min), Some(max)) = (price_min, price_max) {
        if min > max {
            errors.push("price_min", "must not exceed price_max");
        }
    }

    let (Some(skill_level), Some(price_min), Some(price_max)) = (skill_level, price_min, price_max)
    else {
        return Err(errors);
    };
    if !errors.is_empty() {
        return Err(errors);
    }

    let subjects = subject_ids
        .into_iter()
        .map(|subject_id| SubjectSkill {
            subject_id,
            skill_level_id: skill_level,
        })
        .collect();
    let goals = PURPOSES.map_labels(selection.goals.iter().map(String::as_str));
    let slots = availabilities(&selection.days, &selection.time_slots);
    let regions = catalog::region_ids(selection.regions.iter().map(String::as_str));
    let user_id = selection.user_id.as_ref().and_then(Scalar::as_id);
    let education = selection
        .education
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string);

    let payload = match role {
        Role::Tutor => OnboardingPayload::Tutor(TutorOnboarding {
            user_id,
            tutor_subjects: subjects,
            tutor_goals: goals,
            tutor_lesson_types: lesson_types,
            tutor_availabilities: slots,
            tutor_regions: regions,
            hourly_rate_min: price_min,
            hourly_rate_max: price_max,
            education,
        }),
        Role::Student => OnboardingPayload::Student(StudentOnboarding {
            user_id,
            student_subjects: subjects,
            student_goals: goals,
            student_lesson_types: lesson_types,
            student_availabilities: slots,
            student_regions: regions,
            budget_min: price_min,
            budget_max: price_max,
            education,
        }),
    };

    Ok(payload)
}

fn parse_price(
    field: &'static str,
    value: Option<&Scalar>,
    errors: &mut ValidationErrors,
) -> Option<u32> {
    let text = match value.map(Scalar::to_text) {
        Some(text) if !text.is_empty() => text,
        _ => {
            errors.push(field, "is required");
            return None;
        }
    };

    match text.replace(',', "").parse::<u32>() {
        Ok(price) => Some(price),
        Err(_) => {
            errors.push(field, format!("'{text}' is not a whole number of won"));
            None
        }
    }
}
