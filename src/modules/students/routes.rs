use axum::{
    extract::{Path, Query, State},
    response::Response,
};
use tumae_authz::MaybeBearer;
use tumae_http::{error::AppError, relay};
use tumae_upstream::UpstreamRequest;

use crate::modules::{MatchQuery, SharedBackend};
use crate::utils::require_segment;

pub(super) async fn list_students(
    State(backend): State<SharedBackend>,
    MaybeBearer(token): MaybeBearer,
    Query(query): Query<MatchQuery>,
) -> Result<Response, AppError> {
    let request = query.apply(UpstreamRequest::get("/api/students"))?.bearer(token);

    let reply = backend.send(request).await?;
    Ok(relay::passthrough(reply))
}

pub(super) async fn get_student(
    State(backend): State<SharedBackend>,
    MaybeBearer(token): MaybeBearer,
    Path(student_id): Path<String>,
) -> Result<Response, AppError> {
    let student_id = require_segment("student_id", Some(&student_id))?;

    let reply = backend
        .send(UpstreamRequest::get(format!("/api/students/{student_id}")).bearer(token))
        .await?;
    Ok(relay::passthrough(reply))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{body::Body, http::Request, http::StatusCode, Router};
    use serde_json::json;
    use tumae_kernel::Module;
    use tumae_upstream::testing::RecordingBackend;

    use super::*;
    use crate::modules::{students::StudentsModule, testing::send};

    fn router(fake: &RecordingBackend) -> Router {
        StudentsModule::new(Arc::new(fake.clone())).routes()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn list_applies_defaults() {
        let fake = RecordingBackend::replying(200, json!({"students": []}));

        let (status, body) = send(router(&fake), get("/?user_id=4")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"students": []}));
        assert_eq!(
            fake.only_call().path_and_query(),
            "/api/students?user_id=4&min_score=50&limit=20&offset=0"
        );
    }

    #[tokio::test]
    async fn list_forwards_overrides_and_distance() {
        let fake = RecordingBackend::replying(200, json!([]));

        send(router(&fake), get("/?user_id=4&min_score=70&max_distance_km=10&limit=5")).await;

        assert_eq!(
            fake.only_call().path_and_query(),
            "/api/students?user_id=4&min_score=70&limit=5&offset=0&max_distance_km=10"
        );
    }

    #[tokio::test]
    async fn list_without_user_is_rejected() {
        let fake = RecordingBackend::replying(200, json!([]));

        let (status, _) = send(router(&fake), get("/?min_score=70")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(fake.call_count(), 0);
    }

    #[tokio::test]
    async fn profile_is_relayed() {
        let fake = RecordingBackend::replying(404, json!({"detail": "student not found"}));

        let (status, body) = send(router(&fake), get("/99")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "student not found");
        assert_eq!(fake.only_call().path, "/api/students/99");
    }
}
