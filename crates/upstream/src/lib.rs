//! Client side of the remote backend API.
//!
//! Handlers talk to the backend only through the [`Backend`] trait. A request
//! is a method, a path relative to the configured base URL, an optional query
//! string, an optional JSON body and an optional bearer token. The reply is the
//! backend status plus its parsed JSON body; anything that prevents getting a
//! JSON body back is an [`UpstreamError`].

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub mod client;
pub mod endpoint;
pub mod envelope;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use client::HttpBackend;

/// HTTP methods used against the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

/// A single call to the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub bearer: Option<String>,
    pub timeout: Option<Duration>,
}

impl UpstreamRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            bearer: None,
            timeout: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::Patch, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Append a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Append a query parameter only when a non-empty value is present.
    pub fn query_opt(self, key: &str, value: Option<&str>) -> Self {
        match value {
            Some(value) if !value.is_empty() => self.query(key, value),
            _ => self,
        }
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn bearer(mut self, token: Option<String>) -> Self {
        self.bearer = token;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Path plus encoded query string, as it would appear after the base URL.
    pub fn path_and_query(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.query.iter())
            .finish();
        format!("{}?{}", self.path, query)
    }
}

/// The backend's answer: status code and parsed JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: Value,
}

impl UpstreamResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Failures that keep the gateway from obtaining a JSON reply.
#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("backend unreachable: {0}")]
    Transport(String),

    #[error("backend call timed out")]
    Timeout,

    #[error("backend returned a non-JSON body (status {status}, content-type {content_type:?})")]
    NonJson {
        status: u16,
        content_type: Option<String>,
    },

    #[error("backend body could not be parsed: {0}")]
    Decode(String),
}

/// Seam between handlers and the remote backend.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn send(&self, request: UpstreamRequest) -> Result<UpstreamResponse, UpstreamError>;
}
