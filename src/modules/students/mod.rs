mod routes;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{routing::get, Router};
use serde_json::json;
use tumae_kernel::Module;

use super::{match_query_params, SharedBackend};
use crate::utils::{operation, path_param};

/// Student matches for a tutor.
pub struct StudentsModule {
    backend: SharedBackend,
}

impl StudentsModule {
    pub fn new(backend: SharedBackend) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Module for StudentsModule {
    fn name(&self) -> &'static str {
        "students"
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/", get(routes::list_students))
            .route("/{student_id}", get(routes::get_student))
            .with_state(self.backend.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(json!({
            "paths": {
                "": {
                    "get": operation("Students", "Students matched to a tutor", 200, match_query_params())
                },
                "/{student_id}": {
                    "get": operation("Students", "A student's profile", 200, vec![path_param("student_id")])
                }
            }
        }))
    }
}

pub fn create_module(backend: SharedBackend) -> Arc<dyn Module> {
    Arc::new(StudentsModule::new(backend))
}
