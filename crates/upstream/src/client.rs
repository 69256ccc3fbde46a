//! reqwest-backed [`Backend`] implementation.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use tumae_kernel::settings::UpstreamSettings;

use crate::{endpoint, Backend, Method, UpstreamError, UpstreamRequest, UpstreamResponse};

/// Talks to the remote backend over HTTP.
#[derive(Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(settings: &UpstreamSettings) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(settings.request_timeout_ms))
            .build()
            .context("failed to build backend HTTP client")?;

        Ok(Self {
            client,
            base_url: settings.base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

fn reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

fn transport_error(error: reqwest::Error) -> UpstreamError {
    if error.is_timeout() {
        UpstreamError::Timeout
    } else {
        UpstreamError::Transport(error.to_string())
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn send(&self, request: UpstreamRequest) -> Result<UpstreamResponse, UpstreamError> {
        let url = endpoint::api_url(&self.base_url, &request.path);

        tracing::debug!(
            target: "tumae-upstream",
            method = request.method.as_str(),
            url = %url,
            query = ?request.query,
            "calling backend"
        );

        let mut builder = self
            .client
            .request(reqwest_method(request.method), &url)
            .header(CONTENT_TYPE, "application/json");

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        if !content_type
            .as_deref()
            .is_some_and(|value| value.contains("application/json"))
        {
            let text = response.text().await.unwrap_or_default();
            tracing::error!(
                target: "tumae-upstream",
                status,
                content_type = ?content_type,
                body = %text.chars().take(200).collect::<String>(),
                "backend returned a non-JSON body"
            );
            return Err(UpstreamError::NonJson {
                status,
                content_type,
            });
        }

        let bytes = response.bytes().await.map_err(transport_error)?;
        let body: Value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).map_err(|e| UpstreamError::Decode(e.to_string()))?
        };

        if !(200..300).contains(&status) {
            tracing::warn!(
                target: "tumae-upstream",
                status,
                body = %body,
                "backend rejected request"
            );
        }

        Ok(UpstreamResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::Query,
        http::{HeaderMap, StatusCode},
        routing::{get, post},
        Json, Router,
    };
    use serde_json::json;
    use std::collections::HashMap;

    async fn spawn_backend(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/")
    }

    fn backend_for(base_url: String) -> HttpBackend {
        HttpBackend::new(&UpstreamSettings {
            base_url,
            request_timeout_ms: 2000,
            logout_timeout_ms: 500,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn forwards_query_body_and_bearer() {
        let router = Router::new().route(
            "/messages/send",
            post(
                |Query(query): Query<HashMap<String, String>>,
                 headers: HeaderMap,
                 Json(body): Json<Value>| async move {
                    let auth = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    (
                        StatusCode::CREATED,
                        Json(json!({
                            "message": "SUCCESS",
                            "data": {"sender": query["sender_id"], "auth": auth, "echo": body}
                        })),
                    )
                },
            ),
        );
        let backend = backend_for(spawn_backend(router).await);

        let response = backend
            .send(
                UpstreamRequest::post("/messages/send")
                    .query("sender_id", "4")
                    .json(json!({"receiver_id": 9}))
                    .bearer(Some("token-1".to_string())),
            )
            .await
            .unwrap();

        assert_eq!(response.status, 201);
        assert_eq!(response.body["data"]["sender"], "4");
        assert_eq!(response.body["data"]["auth"], "Bearer token-1");
        assert_eq!(response.body["data"]["echo"]["receiver_id"], 9);
    }

    #[tokio::test]
    async fn error_status_is_returned_not_raised() {
        let router = Router::new().route(
            "/community/posts/1",
            get(|| async { (StatusCode::NOT_FOUND, Json(json!({"detail": "Post not found"}))) }),
        );
        let backend = backend_for(spawn_backend(router).await);

        let response = backend
            .send(UpstreamRequest::get("/community/posts/1"))
            .await
            .unwrap();

        assert_eq!(response.status, 404);
        assert_eq!(response.body["detail"], "Post not found");
    }

    #[tokio::test]
    async fn non_json_body_is_an_error() {
        let router = Router::new().route("/resume/3", get(|| async { "<html>oops</html>" }));
        let backend = backend_for(spawn_backend(router).await);

        let result = backend.send(UpstreamRequest::get("/resume/3")).await;

        assert!(matches!(
            result,
            Err(UpstreamError::NonJson { status: 200, .. })
        ));
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_transport_error() {
        let backend = backend_for("http://127.0.0.1:1".to_string());

        let result = backend.send(UpstreamRequest::get("/community/posts")).await;

        assert!(matches!(
            result,
            Err(UpstreamError::Transport(_)) | Err(UpstreamError::Timeout)
        ));
    }
}
