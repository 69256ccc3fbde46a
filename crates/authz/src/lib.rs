//! Bearer token extraction for proxied requests.
//!
//! The gateway never validates tokens itself; it only carries the caller's
//! token on to the backend. A token is taken from `Authorization: Bearer …`
//! and, failing that, from the `x-access-token` header.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use tumae_http::error::AppError;

const ACCESS_TOKEN_HEADER: &str = "x-access-token";

/// Pull the caller's access token out of request headers.
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    let from_authorization = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.strip_prefix("Bearer ").unwrap_or(value).trim())
        .filter(|token| !token.is_empty());

    let token = from_authorization.or_else(|| {
        headers
            .get(ACCESS_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|token| !token.is_empty())
    });

    token.map(str::to_string)
}

/// The caller's token when one was sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaybeBearer(pub Option<String>);

impl<S: Send + Sync> FromRequestParts<S> for MaybeBearer {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(token_from_headers(&parts.headers)))
    }
}

/// The caller's token; requests without one are rejected with 401.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredBearer(pub String);

impl<S: Send + Sync> FromRequestParts<S> for RequiredBearer {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match token_from_headers(&parts.headers) {
            Some(token) => Ok(Self(token)),
            None => {
                tracing::debug!(target: "tumae-authz", path = %parts.uri.path(), "missing access token");
                Err(AppError::unauthorized("authentication is required"))
            }
        }
    }
}
