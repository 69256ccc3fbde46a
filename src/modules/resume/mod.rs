mod routes;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    routing::{get, patch},
    Router,
};
use serde_json::json;
use tumae_kernel::Module;

use super::SharedBackend;
use crate::utils::{operation, path_param, query_param};

/// Block fields a new resume block may carry, in the order they are sent.
pub const BLOCK_FIELDS: [&str; 10] = [
    "block_type",
    "title",
    "period",
    "role",
    "description",
    "tech_stack",
    "issuer",
    "acquired_at",
    "file_url",
    "link_url",
];

/// Tutor resumes made of career, project, certificate and portfolio blocks.
pub struct ResumeModule {
    backend: SharedBackend,
}

impl ResumeModule {
    pub fn new(backend: SharedBackend) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Module for ResumeModule {
    fn name(&self) -> &'static str {
        "resume"
    }

    fn routes(&self) -> Router {
        Router::new()
            .route(
                "/{tutor_id}",
                get(routes::get_resume).post(routes::create_block),
            )
            .route(
                "/block/{block_id}",
                patch(routes::update_block).delete(routes::delete_block),
            )
            .with_state(self.backend.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let mut read = operation("Resume", "Resume blocks of a tutor", 200, vec![path_param("tutor_id")]);
        read["responses"]["200"]["content"]["application/json"]["schema"] = json!({
            "type": "array",
            "items": { "$ref": "#/components/schemas/ResumeBlock" }
        });

        let mut block_properties = serde_json::Map::new();
        for field in BLOCK_FIELDS {
            block_properties.insert(field.to_string(), json!({ "type": "string" }));
        }
        block_properties.insert("id".to_string(), json!({ "type": ["integer", "null"] }));

        Some(json!({
            "paths": {
                "/{tutor_id}": {
                    "get": read,
                    "post": operation("Resume", "Add a block to a resume", 200, vec![path_param("tutor_id")])
                },
                "/block/{block_id}": {
                    "patch": operation("Resume", "Edit a block", 200, vec![path_param("block_id")]),
                    "delete": operation(
                        "Resume",
                        "Remove a block",
                        200,
                        vec![path_param("block_id"), query_param("current_user_id", true)],
                    )
                }
            },
            "components": {
                "schemas": {
                    "ResumeBlock": {
                        "type": "object",
                        "properties": block_properties,
                        "required": ["block_type", "title"]
                    }
                }
            }
        }))
    }
}

pub fn create_module(backend: SharedBackend) -> Arc<dyn Module> {
    Arc::new(ResumeModule::new(backend))
}
