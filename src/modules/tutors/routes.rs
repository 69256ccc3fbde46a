use axum::{
    extract::{Path, Query, State},
    response::Response,
};
use serde::Deserialize;
use tumae_authz::MaybeBearer;
use tumae_http::{error::AppError, relay};
use tumae_upstream::UpstreamRequest;

use crate::modules::{MatchQuery, SharedBackend};
use crate::normalize;
use crate::utils::require_segment;

const DEFAULT_RANKING_LIMIT: &str = "3";

#[derive(Debug, Default, Deserialize)]
pub(super) struct RankingQuery {
    limit: Option<String>,
}

pub(super) async fn list_tutors(
    State(backend): State<SharedBackend>,
    MaybeBearer(token): MaybeBearer,
    Query(query): Query<MatchQuery>,
) -> Result<Response, AppError> {
    let request = query.apply(UpstreamRequest::get("/api/tutors"))?.bearer(token);

    let reply = backend.send(request).await?;
    Ok(relay::normalized(reply, normalize::tutor_list))
}

pub(super) async fn get_tutor(
    State(backend): State<SharedBackend>,
    MaybeBearer(token): MaybeBearer,
    Path(tutor_id): Path<String>,
) -> Result<Response, AppError> {
    let tutor_id = require_segment("tutor_id", Some(&tutor_id))?;

    let reply = backend
        .send(UpstreamRequest::get(format!("/api/tutors/{tutor_id}")).bearer(token))
        .await?;
    Ok(relay::passthrough(reply))
}

pub(super) async fn best_tutors(
    State(backend): State<SharedBackend>,
    Query(query): Query<RankingQuery>,
) -> Result<Response, AppError> {
    let limit = query
        .limit
        .as_deref()
        .map(str::trim)
        .filter(|limit| !limit.is_empty())
        .unwrap_or(DEFAULT_RANKING_LIMIT);

    let reply = backend
        .send(UpstreamRequest::get("/api/tutors/rankings/best").query("limit", limit))
        .await?;
    Ok(relay::passthrough(reply))
}
