use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tumae_authz::MaybeBearer;
use tumae_http::{error::AppError, relay};
use tumae_upstream::UpstreamRequest;

use crate::modules::SharedBackend;
use crate::normalize;
use crate::utils::{require, require_member, require_segment, JsonBody};

#[derive(Debug, Default, Deserialize)]
pub(super) struct UserQuery {
    user_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct SenderQuery {
    sender_id: Option<String>,
}

async fn mailbox(
    backend: SharedBackend,
    box_name: &str,
    query: UserQuery,
    token: Option<String>,
) -> Result<Response, AppError> {
    let user_id = require("user_id", query.user_id.as_deref())?;

    let request = UpstreamRequest::get(format!("/messages/{box_name}"))
        .query("user_id", user_id)
        .bearer(token);

    let reply = backend.send(request).await?;
    Ok(relay::normalized(reply, normalize::message_list))
}

pub(super) async fn inbox(
    State(backend): State<SharedBackend>,
    MaybeBearer(token): MaybeBearer,
    Query(query): Query<UserQuery>,
) -> Result<Response, AppError> {
    mailbox(backend, "inbox", query, token).await
}

pub(super) async fn sent(
    State(backend): State<SharedBackend>,
    MaybeBearer(token): MaybeBearer,
    Query(query): Query<UserQuery>,
) -> Result<Response, AppError> {
    mailbox(backend, "sent", query, token).await
}

pub(super) async fn get_message(
    State(backend): State<SharedBackend>,
    MaybeBearer(token): MaybeBearer,
    Path(message_id): Path<String>,
    Query(query): Query<UserQuery>,
) -> Result<Response, AppError> {
    let message_id = require_segment("message_id", Some(&message_id))?;
    let user_id = require("user_id", query.user_id.as_deref())?;

    let request = UpstreamRequest::get(format!("/messages/{message_id}"))
        .query("user_id", user_id)
        .bearer(token);

    let reply = backend.send(request).await?;
    Ok(relay::unwrap(reply, StatusCode::OK))
}

/// Only the known message fields are forwarded; `reply_to` when set.
pub(super) async fn send_message(
    State(backend): State<SharedBackend>,
    MaybeBearer(token): MaybeBearer,
    Query(query): Query<SenderQuery>,
    JsonBody(body): JsonBody,
) -> Result<Response, AppError> {
    let sender_id = require("sender_id", query.sender_id.as_deref())?;

    let mut message = json!({
        "receiver_id": require_member(&body, "receiver_id")?,
        "subject": require_member(&body, "subject")?,
        "body": require_member(&body, "body")?,
    });
    if let Some(reply_to) = body.get("reply_to").filter(|v| is_set(v)) {
        message["reply_to"] = reply_to.clone();
    }

    let request = UpstreamRequest::post("/messages/send")
        .query("sender_id", sender_id)
        .json(message)
        .bearer(token);

    let reply = backend.send(request).await?;
    Ok(relay::with_status(reply, StatusCode::CREATED))
}

fn is_set(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Number(n) => n.as_f64() != Some(0.0),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{body::Body, http::Request, Router};
    use tumae_kernel::Module;
    use tumae_upstream::testing::RecordingBackend;

    use super::*;
    use crate::modules::{messages::MessagesModule, testing::send};

    fn router(fake: &RecordingBackend) -> Router {
        MessagesModule::new(Arc::new(fake.clone())).routes()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn send_request(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn inbox_without_user_is_400_and_offline() {
        let fake = RecordingBackend::replying(200, json!([]));

        let (status, body) = send(router(&fake), get("/inbox")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "user_id is required");
        assert_eq!(fake.call_count(), 0);
    }

    #[tokio::test]
    async fn inbox_is_normalized() {
        let fake = RecordingBackend::replying(
            200,
            json!({"message": "SUCCESS", "data": {"messages": [
                {"message_id": 4, "sender_id": 2, "preview": "안녕하세요", "read": false}
            ]}}),
        );

        let (status, body) = send(router(&fake), get("/inbox?user_id=5")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["id"], 4);
        assert_eq!(body[0]["body"], "안녕하세요");
        assert_eq!(body[0]["is_read"], false);
        assert_eq!(fake.only_call().path_and_query(), "/messages/inbox?user_id=5");
    }

    #[tokio::test]
    async fn sent_box_uses_its_own_backend_path() {
        let fake = RecordingBackend::replying(200, json!([]));

        let (status, body) = send(router(&fake), get("/sent?user_id=5")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
        assert_eq!(fake.only_call().path, "/messages/sent");
    }

    #[tokio::test]
    async fn read_message_relays_not_found() {
        let fake = RecordingBackend::replying(404, json!({"detail": "message not found"}));

        let (status, body) = send(router(&fake), get("/12?user_id=5")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"detail": "message not found"}));
        assert_eq!(fake.only_call().path_and_query(), "/messages/12?user_id=5");
    }

    #[tokio::test]
    async fn send_forwards_known_fields_and_answers_201() {
        let fake = RecordingBackend::replying(200, json!({"message": "sent"}));

        let (status, body) = send(
            router(&fake),
            send_request(
                "/send?sender_id=3",
                json!({"receiver_id": 8, "subject": "수업 문의", "body": "가능한 시간?", "reply_to": null, "extra": 1}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body, json!({"message": "sent"}));

        let call = fake.only_call();
        assert_eq!(call.path_and_query(), "/messages/send?sender_id=3");
        assert_eq!(
            call.body,
            Some(json!({"receiver_id": 8, "subject": "수업 문의", "body": "가능한 시간?"}))
        );
    }

    #[tokio::test]
    async fn send_without_subject_is_rejected() {
        let fake = RecordingBackend::replying(200, json!({}));

        let (status, _) = send(
            router(&fake),
            send_request("/send?sender_id=3", json!({"receiver_id": 8, "body": "hi"})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(fake.call_count(), 0);
    }

    #[tokio::test]
    async fn send_failure_status_is_not_overridden() {
        let fake = RecordingBackend::replying(422, json!({"detail": [{"loc": ["body", "receiver_id"], "msg": "invalid"}]}));

        let (status, _) = send(
            router(&fake),
            send_request("/send?sender_id=3", json!({"receiver_id": 8, "subject": "s", "body": "b", "reply_to": 2})),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(fake.only_call().body.unwrap()["reply_to"], 2);
    }
}
