use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
};
use serde::Deserialize;
use tumae_authz::MaybeBearer;
use tumae_http::{error::AppError, relay};
use tumae_upstream::UpstreamRequest;

use crate::modules::SharedBackend;
use crate::utils::{member_text, require_segment, JsonBody};

#[derive(Debug, Default, Deserialize)]
pub(super) struct PostListQuery {
    page: Option<String>,
    limit: Option<String>,
    order: Option<String>,
}

pub(super) async fn list_posts(
    State(backend): State<SharedBackend>,
    Query(query): Query<PostListQuery>,
) -> Result<Response, AppError> {
    let request = UpstreamRequest::get("/community/posts")
        .query_opt("page", query.page.as_deref())
        .query_opt("limit", query.limit.as_deref())
        .query_opt("order", query.order.as_deref());

    let reply = backend.send(request).await?;
    Ok(relay::unwrap(reply, StatusCode::OK))
}

pub(super) async fn create_post(
    State(backend): State<SharedBackend>,
    MaybeBearer(token): MaybeBearer,
    JsonBody(body): JsonBody,
) -> Result<Response, AppError> {
    let reply = backend
        .send(UpstreamRequest::post("/community/posts").json(body).bearer(token))
        .await?;
    Ok(relay::passthrough(reply))
}

pub(super) async fn get_post(
    State(backend): State<SharedBackend>,
    Path(post_id): Path<String>,
) -> Result<Response, AppError> {
    let post_id = require_segment("post_id", Some(&post_id))?;

    let reply = backend
        .send(UpstreamRequest::get(format!("/community/posts/{post_id}")))
        .await?;
    Ok(relay::unwrap(reply, StatusCode::OK))
}

/// The backend takes the answer as query parameters, not as a body.
pub(super) async fn create_answer(
    State(backend): State<SharedBackend>,
    MaybeBearer(token): MaybeBearer,
    Path(post_id): Path<String>,
    JsonBody(body): JsonBody,
) -> Result<Response, AppError> {
    let post_id = require_segment("post_id", Some(&post_id))?;
    let author_id = member_text(&body, "author_id")?;
    let text = member_text(&body, "body")?;

    let request = UpstreamRequest::post(format!("/community/posts/{post_id}/answers"))
        .query("author_id", author_id)
        .query("body", text)
        .bearer(token);

    let reply = backend.send(request).await?;
    Ok(relay::unwrap(reply, StatusCode::CREATED))
}

pub(super) async fn accept_answer(
    State(backend): State<SharedBackend>,
    MaybeBearer(token): MaybeBearer,
    Path(answer_id): Path<String>,
    JsonBody(body): JsonBody,
) -> Result<Response, AppError> {
    let answer_id = require_segment("answer_id", Some(&answer_id))?;
    let user_id = member_text(&body, "user_id")?;

    let request = UpstreamRequest::patch(format!("/community/answers/{answer_id}/accept"))
        .query("user_id", user_id)
        .bearer(token);

    let reply = backend.send(request).await?;
    Ok(relay::unwrap(reply, StatusCode::OK))
}
