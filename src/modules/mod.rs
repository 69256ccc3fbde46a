pub mod auth;
pub mod community;
pub mod messages;
pub mod onboarding;
pub mod resume;
pub mod students;
pub mod tutors;

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tumae_http::error::AppError;
use tumae_kernel::{settings::Settings, ModuleRegistry};
use tumae_upstream::{Backend, UpstreamRequest};

use crate::utils::{query_param, require};

/// Backend handle shared by every proxy route.
pub type SharedBackend = Arc<dyn Backend>;

/// Register all gateway modules with the registry
pub fn register_all(
    registry: &mut ModuleRegistry,
    backend: SharedBackend,
    settings: &Settings,
) -> anyhow::Result<()> {
    registry.register(auth::create_module(backend.clone(), &settings.upstream))?;
    registry.register(community::create_module(backend.clone()))?;
    registry.register(messages::create_module(backend.clone()))?;
    registry.register(resume::create_module(backend.clone()))?;
    registry.register(students::create_module(backend.clone()))?;
    registry.register(tutors::create_module(backend.clone()))?;
    registry.register(onboarding::create_module(backend))?;
    Ok(())
}

/// Query of the student and tutor match lists.
#[derive(Debug, Default, Deserialize)]
pub struct MatchQuery {
    user_id: Option<String>,
    min_score: Option<String>,
    limit: Option<String>,
    offset: Option<String>,
    max_distance_km: Option<String>,
}

impl MatchQuery {
    /// Append the match parameters to `request`, filling in defaults.
    pub fn apply(self, request: UpstreamRequest) -> Result<UpstreamRequest, AppError> {
        let user_id = require("user_id", self.user_id.as_deref())?;

        Ok(request
            .query("user_id", user_id)
            .query("min_score", or_default(self.min_score.as_deref(), "50"))
            .query("limit", or_default(self.limit.as_deref(), "20"))
            .query("offset", or_default(self.offset.as_deref(), "0"))
            .query_opt("max_distance_km", self.max_distance_km.as_deref().map(str::trim)))
    }
}

fn or_default<'a>(value: Option<&'a str>, default: &'a str) -> &'a str {
    value.map(str::trim).filter(|v| !v.is_empty()).unwrap_or(default)
}

pub(crate) fn match_query_params() -> Vec<Value> {
    vec![
        query_param("user_id", true),
        query_param("min_score", false),
        query_param("limit", false),
        query_param("offset", false),
        query_param("max_distance_km", false),
    ]
}

#[cfg(test)]
pub(crate) mod testing {
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        Router,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    /// Run one request through `router`; an empty body reads as `Null`.
    pub(crate) async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, http::StatusCode};
    use serde_json::json;
    use tumae_upstream::testing::RecordingBackend;

    fn registry(fake: &RecordingBackend) -> ModuleRegistry {
        let mut registry = ModuleRegistry::new();
        register_all(&mut registry, Arc::new(fake.clone()), &Settings::default()).unwrap();
        registry
    }

    #[test]
    fn every_module_registers_once() {
        let fake = RecordingBackend::replying(200, json!({}));
        let mut registry = registry(&fake);
        assert_eq!(registry.module_count(), 7);

        assert!(register_all(&mut registry, Arc::new(fake), &Settings::default()).is_err());
    }

    #[tokio::test]
    async fn routes_are_mounted_under_api_prefix() {
        let fake = RecordingBackend::replying(200, json!({"message": "SUCCESS", "data": [{"post_id": 1}]}));
        let router = tumae_http::build_router(&registry(&fake), &Settings::default());

        let (status, body) = testing::send(
            router.clone(),
            Request::builder().uri("/api/community/posts").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([{"post_id": 1}]));

        let (status, _) = testing::send(
            router.clone(),
            Request::builder().uri("/api/students?user_id=1").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fake.call_count(), 2);

        let (status, body) = testing::send(
            router,
            Request::builder().uri("/api/unknown").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "not_found");
    }

    #[tokio::test]
    async fn merged_openapi_lists_module_paths() {
        let fake = RecordingBackend::replying(200, json!({}));
        let router = tumae_http::build_router(&registry(&fake), &Settings::default());

        let (status, doc) = testing::send(
            router,
            Request::builder().uri("/docs/openapi.json").body(Body::empty()).unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(doc["paths"]["/api/messages/send"]["post"].is_object());
        assert!(doc["paths"]["/api/tutors"]["get"].is_object());
        assert!(doc["components"]["schemas"]["TutorSummary"].is_object());
    }
}
