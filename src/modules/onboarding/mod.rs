mod routes;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{routing::post, Router};
use serde_json::json;
use tumae_kernel::Module;

use super::SharedBackend;
use crate::utils::{operation, path_param};

/// Onboarding submission for tutors and students.
///
/// Forms are aggregated and validated here; only a complete payload is sent
/// to the backend, once.
pub struct OnboardingModule {
    backend: SharedBackend,
}

impl OnboardingModule {
    pub fn new(backend: SharedBackend) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Module for OnboardingModule {
    fn name(&self) -> &'static str {
        "onboarding"
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/tutor", post(routes::submit_tutor))
            .route("/student", post(routes::submit_student))
            .route("/{role}/preview", post(routes::preview))
            .with_state(self.backend.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let submission = |summary: &str| {
            let mut op = operation("Onboarding", summary, 200, vec![]);
            op["requestBody"] = json!({
                "required": true,
                "content": { "application/json": { "schema": { "$ref": "#/components/schemas/OnboardingSelection" } } }
            });
            op["responses"]["422"] = json!({
                "description": "Every rejected field of the form",
                "content": { "application/json": { "schema": { "$ref": "#/components/schemas/ErrorResponse" } } }
            });
            op
        };

        let mut preview = submission("Aggregate a form without submitting it");
        preview["parameters"] = json!([path_param("role")]);

        let labels = json!({ "type": "array", "items": { "type": "string" } });
        let scalar = json!({ "type": ["integer", "string"] });

        Some(json!({
            "paths": {
                "/tutor": { "post": submission("Submit tutor onboarding") },
                "/student": { "post": submission("Submit student onboarding") },
                "/{role}/preview": { "post": preview }
            },
            "components": {
                "schemas": {
                    "OnboardingSelection": {
                        "type": "object",
                        "properties": {
                            "user_id": scalar,
                            "subjects": labels,
                            "goals": labels,
                            "lesson_types": labels,
                            "skill_levels": labels,
                            "days": labels,
                            "time_slots": labels,
                            "regions": labels,
                            "price_min": scalar,
                            "price_max": scalar,
                            "education": { "type": "string" }
                        }
                    }
                }
            }
        }))
    }
}

pub fn create_module(backend: SharedBackend) -> Arc<dyn Module> {
    Arc::new(OnboardingModule::new(backend))
}
