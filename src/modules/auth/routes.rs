use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};
use tumae_authz::{MaybeBearer, RequiredBearer};
use tumae_http::{error::AppError, relay};
use tumae_upstream::UpstreamRequest;

use super::AuthState;
use crate::utils::{require_member, require_segment, JsonBody, MaybeJsonBody};

pub(super) async fn signup(
    State(state): State<AuthState>,
    JsonBody(body): JsonBody,
) -> Result<Response, AppError> {
    let reply = state
        .backend
        .send(UpstreamRequest::post("/auth/signup").json(body))
        .await?;
    Ok(relay::passthrough(reply))
}

pub(super) async fn login(
    State(state): State<AuthState>,
    JsonBody(body): JsonBody,
) -> Result<Response, AppError> {
    require_member(&body, "email")?;
    require_member(&body, "password")?;

    let reply = state
        .backend
        .send(UpstreamRequest::post("/auth/login").json(body))
        .await?;
    Ok(relay::unwrap(reply, StatusCode::OK))
}

/// Logout is bounded by its own, shorter timeout so a slow backend cannot
/// hold the caller's session teardown.
pub(super) async fn logout(
    State(state): State<AuthState>,
    MaybeBearer(token): MaybeBearer,
    MaybeJsonBody(body): MaybeJsonBody,
) -> Result<Response, AppError> {
    let mut request = UpstreamRequest::post("/auth/logout")
        .bearer(token)
        .timeout(state.logout_timeout);
    if let Some(body) = body {
        request = request.json(body);
    }

    let reply = state.backend.send(request).await?;
    Ok(relay::passthrough(reply))
}

pub(super) async fn delete_user(
    State(state): State<AuthState>,
    RequiredBearer(token): RequiredBearer,
    Path(user_id): Path<String>,
) -> Result<Response, AppError> {
    let user_id = require_segment("user_id", Some(&user_id))?;

    tracing::info!(user_id, "deleting account");
    let reply = state
        .backend
        .send(UpstreamRequest::delete(format!("/auth/users/{user_id}")).bearer(Some(token)))
        .await?;
    Ok(relay::unwrap(reply, StatusCode::OK))
}

pub(super) async fn update_student_details(
    State(state): State<AuthState>,
    MaybeBearer(token): MaybeBearer,
    JsonBody(body): JsonBody,
) -> Result<Response, AppError> {
    let reply = state
        .backend
        .send(
            UpstreamRequest::patch("/auth/students/details")
                .json(body)
                .bearer(token),
        )
        .await?;
    Ok(relay::passthrough(reply))
}
