mod routes;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    routing::{get, patch, post},
    Router,
};
use serde_json::json;
use tumae_kernel::Module;

use super::SharedBackend;
use crate::utils::{operation, path_param, query_param};

/// Community Q&A: posts, answers and answer acceptance.
pub struct CommunityModule {
    backend: SharedBackend,
}

impl CommunityModule {
    pub fn new(backend: SharedBackend) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Module for CommunityModule {
    fn name(&self) -> &'static str {
        "community"
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/posts", get(routes::list_posts).post(routes::create_post))
            .route("/posts/{post_id}", get(routes::get_post))
            .route("/posts/{post_id}/answers", post(routes::create_answer))
            .route("/answers/{answer_id}/accept", patch(routes::accept_answer))
            .with_state(self.backend.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(json!({
            "paths": {
                "/posts": {
                    "get": operation(
                        "Community",
                        "List posts",
                        200,
                        vec![
                            query_param("page", false),
                            query_param("limit", false),
                            query_param("order", false),
                        ],
                    ),
                    "post": operation("Community", "Create a post", 200, vec![])
                },
                "/posts/{post_id}": {
                    "get": operation("Community", "Read a post with its answers", 200, vec![path_param("post_id")])
                },
                "/posts/{post_id}/answers": {
                    "post": operation(
                        "Community",
                        "Answer a post",
                        201,
                        vec![path_param("post_id")],
                    )
                },
                "/answers/{answer_id}/accept": {
                    "patch": operation(
                        "Community",
                        "Accept an answer as the post author",
                        200,
                        vec![path_param("answer_id")],
                    )
                }
            }
        }))
    }
}

pub fn create_module(backend: SharedBackend) -> Arc<dyn Module> {
    Arc::new(CommunityModule::new(backend))
}
