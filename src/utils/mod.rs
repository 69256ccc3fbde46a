//! Helpers shared by the proxy modules.

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde_json::{json, Value};
use tumae_http::error::AppError;

/// A JSON request body that must be present.
///
/// Unlike `axum::Json` it does not insist on a content type, and rejections
/// use the gateway error body.
#[derive(Debug, Clone)]
pub struct JsonBody(pub Value);

/// A JSON request body that may be empty.
#[derive(Debug, Clone, Default)]
pub struct MaybeJsonBody(pub Option<Value>);

async fn read_body<S: Send + Sync>(req: Request, state: &S) -> Result<Option<Value>, AppError> {
    let bytes = Bytes::from_request(req, state)
        .await
        .map_err(|rejection| AppError::bad_request(rejection.body_text()))?;
    optional_json(&bytes)
}

impl<S: Send + Sync> FromRequest<S> for JsonBody {
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        read_body(req, state)
            .await?
            .map(Self)
            .ok_or_else(|| AppError::bad_request("request body is required"))
    }
}

impl<S: Send + Sync> FromRequest<S> for MaybeJsonBody {
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        read_body(req, state).await.map(Self)
    }
}

/// A required identifier or field, trimmed; blank counts as missing.
pub fn require<'a>(field: &str, value: Option<&'a str>) -> Result<&'a str, AppError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::missing(field))
}

/// A required identifier that is spliced into a backend path.
///
/// The value must stay a single path segment: separators, dots and URL
/// delimiters are rejected so a decoded id cannot address another resource.
pub fn require_segment<'a>(field: &str, value: Option<&'a str>) -> Result<&'a str, AppError> {
    let value = require(field, value)?;
    if value.contains(['/', '\\', '.', '?', '#', '%']) {
        tracing::debug!(field, value, "rejecting path identifier");
        return Err(AppError::bad_request(format!("{field} is not a valid identifier")));
    }
    Ok(value)
}

/// A required member of a JSON body. Strings must be non-blank; numbers are
/// accepted as they are.
pub fn require_member<'a>(body: &'a Value, field: &str) -> Result<&'a Value, AppError> {
    match body.get(field) {
        Some(Value::String(s)) if s.trim().is_empty() => Err(AppError::missing(field)),
        Some(Value::Null) | None => Err(AppError::missing(field)),
        Some(value) => Ok(value),
    }
}

/// A required body member rendered for a query string.
pub fn member_text(body: &Value, field: &str) -> Result<String, AppError> {
    Ok(match require_member(body, field)? {
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    })
}

/// Request body parsed as JSON; an empty body is `None`.
pub fn optional_json(bytes: &Bytes) -> Result<Option<Value>, AppError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(bytes)
        .map(Some)
        .map_err(|e| AppError::bad_request(format!("request body is not valid JSON: {e}")))
}

/// OpenAPI operation object for a proxied route.
///
/// Error statuses relayed from the backend are not enumerated; every route
/// documents the gateway's own 400 and 500 answers.
pub fn operation(tag: &str, summary: &str, success: u16, parameters: Vec<Value>) -> Value {
    json!({
        "summary": summary,
        "tags": [tag],
        "parameters": parameters,
        "responses": {
            (success.to_string()): {
                "description": "Backend reply",
                "content": { "application/json": { "schema": {} } }
            },
            "400": error_response("Missing identifier"),
            "500": error_response("Backend unreachable or returned an unreadable body")
        }
    })
}

pub fn path_param(name: &str) -> Value {
    json!({"name": name, "in": "path", "required": true, "schema": {"type": "string"}})
}

pub fn query_param(name: &str, required: bool) -> Value {
    json!({"name": name, "in": "query", "required": required, "schema": {"type": "string"}})
}

fn error_response(description: &str) -> Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/ErrorResponse" }
            }
        }
    })
}
