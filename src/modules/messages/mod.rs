mod routes;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    routing::{get, post},
    Router,
};
use serde_json::json;
use tumae_kernel::Module;

use super::SharedBackend;
use crate::utils::{operation, path_param, query_param};

/// Direct messages between students and tutors.
pub struct MessagesModule {
    backend: SharedBackend,
}

impl MessagesModule {
    pub fn new(backend: SharedBackend) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Module for MessagesModule {
    fn name(&self) -> &'static str {
        "messages"
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/inbox", get(routes::inbox))
            .route("/sent", get(routes::sent))
            .route("/send", post(routes::send_message))
            .route("/{message_id}", get(routes::get_message))
            .with_state(self.backend.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let mut inbox = operation("Messages", "Received messages", 200, vec![query_param("user_id", true)]);
        inbox["responses"]["200"]["content"]["application/json"]["schema"] = json!({
            "type": "array",
            "items": { "$ref": "#/components/schemas/MessageSummary" }
        });
        let mut sent = inbox.clone();
        sent["summary"] = json!("Sent messages");

        Some(json!({
            "paths": {
                "/inbox": { "get": inbox },
                "/sent": { "get": sent },
                "/send": {
                    "post": operation("Messages", "Send a message", 201, vec![query_param("sender_id", true)])
                },
                "/{message_id}": {
                    "get": operation(
                        "Messages",
                        "Read a message",
                        200,
                        vec![path_param("message_id"), query_param("user_id", true)],
                    )
                }
            },
            "components": {
                "schemas": {
                    "MessageSummary": {
                        "type": "object",
                        "properties": {
                            "id": { "type": ["integer", "null"] },
                            "sender_id": { "type": ["integer", "null"] },
                            "sender_name": { "type": ["string", "null"] },
                            "receiver_id": { "type": ["integer", "null"] },
                            "receiver_name": { "type": ["string", "null"] },
                            "subject": { "type": "string" },
                            "body": { "type": "string" },
                            "created_at": { "type": ["string", "null"] },
                            "is_read": { "type": "boolean" },
                            "is_starred": { "type": "boolean" }
                        },
                        "required": ["subject", "body", "is_read", "is_starred"]
                    }
                }
            }
        }))
    }
}

pub fn create_module(backend: SharedBackend) -> Arc<dyn Module> {
    Arc::new(MessagesModule::new(backend))
}
