use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use tumae_authz::MaybeBearer;
use tumae_http::{error::AppError, relay};
use tumae_upstream::UpstreamRequest;

use crate::modules::SharedBackend;
use crate::onboarding::{self, OnboardingSelection, Role, Scalar};
use crate::utils::JsonBody;

fn selection_from(body: Value) -> Result<OnboardingSelection, AppError> {
    serde_json::from_value(body)
        .map_err(|e| AppError::bad_request(format!("onboarding form is malformed: {e}")))
}

async fn submit(
    backend: SharedBackend,
    role: Role,
    token: Option<String>,
    body: Value,
) -> Result<Response, AppError> {
    let selection = selection_from(body)?;
    let Some(user_id) = selection.user_id.as_ref().and_then(Scalar::as_id) else {
        return Err(AppError::missing("user_id"));
    };

    let payload = onboarding::aggregate(role, &selection)?;
    let body = serde_json::to_value(&payload)
        .map_err(|e| AppError::Internal(anyhow::Error::new(e)))?;

    tracing::info!(role = role.as_str(), user_id, "submitting onboarding details");
    let reply = backend
        .send(
            UpstreamRequest::patch(role.details_path())
                .json(body)
                .bearer(token),
        )
        .await?;
    Ok(relay::passthrough(reply))
}

pub(super) async fn submit_tutor(
    State(backend): State<SharedBackend>,
    MaybeBearer(token): MaybeBearer,
    JsonBody(body): JsonBody,
) -> Result<Response, AppError> {
    submit(backend, Role::Tutor, token, body).await
}

pub(super) async fn submit_student(
    State(backend): State<SharedBackend>,
    MaybeBearer(token): MaybeBearer,
    JsonBody(body): JsonBody,
) -> Result<Response, AppError> {
    submit(backend, Role::Student, token, body).await
}

pub(super) async fn preview(
    Path(role): Path<String>,
    JsonBody(body): JsonBody,
) -> Result<Response, AppError> {
    let role: Role = role.parse().map_err(AppError::not_found)?;
    let selection = selection_from(body)?;
    let payload = onboarding::aggregate(role, &selection)?;
    Ok(Json(payload).into_response())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{body::Body, http::Request, http::StatusCode, Router};
    use serde_json::json;
    use tumae_kernel::Module;
    use tumae_upstream::{testing::RecordingBackend, Method};

    use super::*;
    use crate::modules::{onboarding::OnboardingModule, testing::send};

    fn router(fake: &RecordingBackend) -> Router {
        OnboardingModule::new(Arc::new(fake.clone())).routes()
    }

    fn post(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn tutor_form() -> Value {
        json!({
            "user_id": 12,
            "subjects": ["Python"],
            "purpose": ["취업준비"],
            "teachingMethod": ["온라인 과외"],
            "levels": ["기본 활용 가능"],
            "days": ["월", "화"],
            "timeSlots": ["오전(08~ 11시)"],
            "price_min": "20000",
            "price_max": "30000"
        })
    }

    #[tokio::test]
    async fn tutor_form_is_aggregated_and_sent_once() {
        let fake = RecordingBackend::replying(200, json!({"message": "SUCCESS"}));

        let (status, _) = send(router(&fake), post("/tutor", tutor_form())).await;

        assert_eq!(status, StatusCode::OK);
        let call = fake.only_call();
        assert_eq!(call.method, Method::Patch);
        assert_eq!(call.path, "/auth/tutors/details");

        let sent = call.body.unwrap();
        assert_eq!(sent["tutor_subjects"], json!([{"subject_id": 5, "skill_level_id": 3}]));
        assert_eq!(sent["tutor_goals"], json!([2]));
        assert_eq!(
            sent["tutor_availabilities"],
            json!([{"weekday": 0, "time_band_id": 2}, {"weekday": 1, "time_band_id": 2}])
        );
        assert_eq!(sent["hourly_rate_min"], 20000);
        assert_eq!(sent["hourly_rate_max"], 30000);
    }

    #[tokio::test]
    async fn invalid_form_is_422_without_backend_call() {
        let fake = RecordingBackend::replying(200, json!({}));
        let mut form = tutor_form();
        form["price_max"] = json!("90000");
        form["subjects"] = json!([]);

        let (status, body) = send(router(&fake), post("/tutor", form)).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let fields: Vec<&str> = body["error"]["details"]
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["field"].as_str().unwrap())
            .collect();
        assert_eq!(fields, vec!["subjects", "price_max"]);
        assert_eq!(fake.call_count(), 0);
    }

    #[tokio::test]
    async fn submission_needs_a_user() {
        let fake = RecordingBackend::replying(200, json!({}));
        let mut form = tutor_form();
        form.as_object_mut().unwrap().remove("user_id");

        let (status, body) = send(router(&fake), post("/student", form)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "user_id is required");
        assert_eq!(fake.call_count(), 0);
    }

    #[tokio::test]
    async fn student_form_goes_to_student_details() {
        let fake = RecordingBackend::replying(400, json!({"detail": "student profile missing"}));

        let (status, body) = send(router(&fake), post("/student", tutor_form())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"detail": "student profile missing"}));
        let call = fake.only_call();
        assert_eq!(call.path, "/auth/students/details");
        assert_eq!(call.body.unwrap()["budget_max"], 30000);
    }

    #[tokio::test]
    async fn preview_never_calls_backend() {
        let fake = RecordingBackend::unreachable();

        let (status, body) = send(router(&fake), post("/student/preview", tutor_form())).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["student_lesson_types"], json!([3]));
        assert_eq!(fake.call_count(), 0);

        let (status, _) = send(router(&fake), post("/parent/preview", tutor_form())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
