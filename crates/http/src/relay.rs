//! Turning backend replies into gateway responses.
//!
//! Every proxy route ends in one of these. A non-2xx backend status is always
//! relayed verbatim with the backend's body; the functions differ only in what
//! they do with a successful reply.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use tumae_upstream::{envelope, UpstreamResponse};

fn status_of(response: &UpstreamResponse) -> StatusCode {
    StatusCode::from_u16(response.status).unwrap_or(StatusCode::BAD_GATEWAY)
}

fn log_rejection(response: &UpstreamResponse) {
    tracing::warn!(
        target: "tumae-http::relay",
        status = response.status,
        body = %response.body,
        "relaying backend rejection"
    );
}

/// Relay status and body exactly as the backend sent them.
pub fn passthrough(response: UpstreamResponse) -> Response {
    if !response.is_success() {
        log_rejection(&response);
    }
    (status_of(&response), Json(response.body)).into_response()
}

/// On success answer with `data` under `success`, or pass the body through
/// with the backend status when there is no `data`.
pub fn unwrap(response: UpstreamResponse, success: StatusCode) -> Response {
    if !response.is_success() {
        return passthrough(response);
    }
    match envelope::data(&response.body) {
        Some(_) => (success, Json(envelope::unwrap_data(response.body))).into_response(),
        None => passthrough(response),
    }
}

/// On success pass the whole body through under `success`.
pub fn with_status(response: UpstreamResponse, success: StatusCode) -> Response {
    if !response.is_success() {
        return passthrough(response);
    }
    (success, Json(response.body)).into_response()
}

/// On success convert the unwrapped body into a canonical type.
pub fn normalized<T, F>(response: UpstreamResponse, normalize: F) -> Response
where
    T: Serialize,
    F: FnOnce(Value) -> T,
{
    if !response.is_success() {
        return passthrough(response);
    }
    let body = envelope::unwrap_data(response.body);
    (StatusCode::OK, Json(normalize(body))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::json;

    async fn parts(response: Response) -> (StatusCode, Value) {
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn unwrap_lifts_data_with_route_status() {
        let reply = UpstreamResponse::new(200, json!({"message": "SUCCESS", "data": {"answer_id": 4}}));
        let (status, body) = parts(unwrap(reply, StatusCode::CREATED)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body, json!({"answer_id": 4}));
    }

    #[tokio::test]
    async fn unwrap_without_data_keeps_backend_status() {
        let reply = UpstreamResponse::new(202, json!({"message": "accepted"}));
        let (status, body) = parts(unwrap(reply, StatusCode::OK)).await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body, json!({"message": "accepted"}));
    }

    #[tokio::test]
    async fn rejection_is_relayed_verbatim() {
        let reply = UpstreamResponse::new(403, json!({"detail": "not your answer"}));
        let (status, body) = parts(unwrap(reply, StatusCode::OK)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body, json!({"detail": "not your answer"}));
    }

    #[tokio::test]
    async fn with_status_overrides_success_only() {
        let ok = UpstreamResponse::new(200, json!({"message": "sent"}));
        assert_eq!(parts(with_status(ok, StatusCode::CREATED)).await.0, StatusCode::CREATED);

        let rejected = UpstreamResponse::new(422, json!({"detail": []}));
        assert_eq!(
            parts(with_status(rejected, StatusCode::CREATED)).await.0,
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[tokio::test]
    async fn normalized_runs_on_unwrapped_body() {
        let reply = UpstreamResponse::new(200, json!({"data": {"messages": [1, 2, 3]}}));
        let (status, body) = parts(normalized(reply, |body| envelope::extract_list(body).len())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!(3));
    }
}
