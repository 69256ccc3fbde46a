use axum::{
    extract::{Path, Query, State},
    response::Response,
};
use serde::Deserialize;
use serde_json::Value;
use tumae_authz::MaybeBearer;
use tumae_http::{error::AppError, relay};
use tumae_upstream::UpstreamRequest;

use super::BLOCK_FIELDS;
use crate::modules::SharedBackend;
use crate::normalize;
use crate::utils::{require, require_segment, JsonBody};

#[derive(Debug, Default, Deserialize)]
pub(super) struct DeleteQuery {
    current_user_id: Option<String>,
}

pub(super) async fn get_resume(
    State(backend): State<SharedBackend>,
    MaybeBearer(token): MaybeBearer,
    Path(tutor_id): Path<String>,
) -> Result<Response, AppError> {
    let tutor_id = require_segment("tutor_id", Some(&tutor_id))?;

    let reply = backend
        .send(UpstreamRequest::get(format!("/resume/{tutor_id}")).bearer(token))
        .await?;
    Ok(relay::normalized(reply, normalize::resume_blocks))
}

/// The backend reads new blocks from the query string. Empty fields are
/// left out.
pub(super) async fn create_block(
    State(backend): State<SharedBackend>,
    MaybeBearer(token): MaybeBearer,
    Path(tutor_id): Path<String>,
    JsonBody(body): JsonBody,
) -> Result<Response, AppError> {
    let tutor_id = require_segment("tutor_id", Some(&tutor_id))?;

    let mut request = UpstreamRequest::post(format!("/resume/{tutor_id}")).bearer(token);
    for field in BLOCK_FIELDS {
        let value = match body.get(field) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };
        request = request.query_opt(field, value.as_deref());
    }

    let reply = backend.send(request).await?;
    Ok(relay::passthrough(reply))
}

pub(super) async fn update_block(
    State(backend): State<SharedBackend>,
    MaybeBearer(token): MaybeBearer,
    Path(block_id): Path<String>,
    JsonBody(body): JsonBody,
) -> Result<Response, AppError> {
    let block_id = require_segment("block_id", Some(&block_id))?;

    let reply = backend
        .send(
            UpstreamRequest::patch(format!("/resume/block/{block_id}"))
                .json(body)
                .bearer(token),
        )
        .await?;
    Ok(relay::passthrough(reply))
}

pub(super) async fn delete_block(
    State(backend): State<SharedBackend>,
    MaybeBearer(token): MaybeBearer,
    Path(block_id): Path<String>,
    Query(query): Query<DeleteQuery>,
) -> Result<Response, AppError> {
    let block_id = require_segment("block_id", Some(&block_id))?;
    let current_user_id = require("current_user_id", query.current_user_id.as_deref())?;

    let request = UpstreamRequest::delete(format!("/resume/block/{block_id}"))
        .query("current_user_id", current_user_id)
        .bearer(token);

    let reply = backend.send(request).await?;
    Ok(relay::passthrough(reply))
}
