mod routes;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{routing::get, Router};
use serde_json::json;
use tumae_kernel::Module;

use super::{match_query_params, SharedBackend};
use crate::utils::{operation, path_param, query_param};

/// Tutor matches, profiles and rankings.
pub struct TutorsModule {
    backend: SharedBackend,
}

impl TutorsModule {
    pub fn new(backend: SharedBackend) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Module for TutorsModule {
    fn name(&self) -> &'static str {
        "tutors"
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/", get(routes::list_tutors))
            .route("/rankings/best", get(routes::best_tutors))
            .route("/{tutor_id}", get(routes::get_tutor))
            .with_state(self.backend.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let mut list = operation("Tutors", "Tutors matched to a student", 200, match_query_params());
        list["responses"]["200"]["content"]["application/json"]["schema"] = json!({
            "type": "array",
            "items": { "$ref": "#/components/schemas/TutorSummary" }
        });

        Some(json!({
            "paths": {
                "": { "get": list },
                "/rankings/best": {
                    "get": operation("Tutors", "Best ranked tutors", 200, vec![query_param("limit", false)])
                },
                "/{tutor_id}": {
                    "get": operation("Tutors", "A tutor's profile", 200, vec![path_param("tutor_id")])
                }
            },
            "components": {
                "schemas": {
                    "TutorSummary": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer" },
                            "name": { "type": "string" },
                            "subjects": { "type": "array", "items": { "type": "string" } },
                            "goals": { "type": "array", "items": { "type": "string" } },
                            "lesson_types": { "type": "array", "items": { "type": "string" } },
                            "regions": { "type": "array", "items": { "type": "string" } },
                            "skill_level": { "type": ["string", "null"] },
                            "hourly_rate_min": { "type": ["integer", "null"] },
                            "hourly_rate_max": { "type": ["integer", "null"] },
                            "price_label": { "type": "string" },
                            "match_score": { "type": ["number", "null"] }
                        },
                        "required": ["id", "name", "subjects", "goals", "price_label"]
                    }
                }
            }
        }))
    }
}

pub fn create_module(backend: SharedBackend) -> Arc<dyn Module> {
    Arc::new(TutorsModule::new(backend))
}
