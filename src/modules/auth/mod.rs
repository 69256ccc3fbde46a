mod routes;

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use axum::{
    routing::{delete, patch, post},
    Router,
};
use serde_json::json;
use tumae_kernel::{settings::UpstreamSettings, InitCtx, Module};

use super::SharedBackend;
use crate::utils::{operation, path_param};

/// Account lifecycle: signup, login, logout, deletion and student details.
pub struct AuthModule {
    state: AuthState,
}

#[derive(Clone)]
pub(crate) struct AuthState {
    pub backend: SharedBackend,
    pub logout_timeout: Duration,
}

impl AuthModule {
    pub fn new(backend: SharedBackend, upstream: &UpstreamSettings) -> Self {
        Self {
            state: AuthState {
                backend,
                logout_timeout: Duration::from_millis(upstream.logout_timeout_ms),
            },
        }
    }
}

#[async_trait]
impl Module for AuthModule {
    fn name(&self) -> &'static str {
        "auth"
    }

    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            logout_timeout_ms = self.state.logout_timeout.as_millis() as u64,
            "auth module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/signup", post(routes::signup))
            .route("/login", post(routes::login))
            .route("/logout", post(routes::logout))
            .route("/users/{user_id}", delete(routes::delete_user))
            .route("/students/details", patch(routes::update_student_details))
            .with_state(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let mut delete_user = operation(
            "Auth",
            "Delete an account",
            200,
            vec![path_param("user_id")],
        );
        delete_user["responses"]["401"] = json!({
            "description": "No access token was sent",
            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/ErrorResponse" } } }
        });

        Some(json!({
            "paths": {
                "/signup": { "post": operation("Auth", "Create an account", 200, vec![]) },
                "/login": { "post": operation("Auth", "Log in; answers with the session data", 200, vec![]) },
                "/logout": { "post": operation("Auth", "Log out the bearer's session", 200, vec![]) },
                "/users/{user_id}": { "delete": delete_user },
                "/students/details": { "patch": operation("Auth", "Update student onboarding details", 200, vec![]) }
            }
        }))
    }
}

pub fn create_module(backend: SharedBackend, upstream: &UpstreamSettings) -> Arc<dyn Module> {
    Arc::new(AuthModule::new(backend, upstream))
}
