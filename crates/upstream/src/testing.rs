//! In-memory [`Backend`] for handler tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::{Backend, UpstreamError, UpstreamRequest, UpstreamResponse};

enum Reply {
    Json(u16, Value),
    Unreachable,
    NonJson(u16),
}

/// Records every request and answers with a fixed reply.
#[derive(Clone)]
pub struct RecordingBackend {
    reply: Arc<Reply>,
    calls: Arc<Mutex<Vec<UpstreamRequest>>>,
}

impl RecordingBackend {
    /// Always answer with `status` and `body`.
    pub fn replying(status: u16, body: Value) -> Self {
        Self::with(Reply::Json(status, body))
    }

    /// Always fail as if the network were down.
    pub fn unreachable() -> Self {
        Self::with(Reply::Unreachable)
    }

    /// Always answer with a non-JSON body.
    pub fn non_json(status: u16) -> Self {
        Self::with(Reply::NonJson(status))
    }

    fn with(reply: Reply) -> Self {
        Self {
            reply: Arc::new(reply),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> Vec<UpstreamRequest> {
        self.calls.lock().expect("calls lock poisoned").clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("calls lock poisoned").len()
    }

    /// The single request made so far; panics unless exactly one was made.
    pub fn only_call(&self) -> UpstreamRequest {
        let calls = self.calls();
        assert_eq!(calls.len(), 1, "expected exactly one backend call");
        calls.into_iter().next().expect("one call")
    }
}

#[async_trait]
impl Backend for RecordingBackend {
    async fn send(&self, request: UpstreamRequest) -> Result<UpstreamResponse, UpstreamError> {
        self.calls
            .lock()
            .expect("calls lock poisoned")
            .push(request);

        match self.reply.as_ref() {
            Reply::Json(status, body) => Ok(UpstreamResponse::new(*status, body.clone())),
            Reply::Unreachable => Err(UpstreamError::Transport("connection refused".to_string())),
            Reply::NonJson(status) => Err(UpstreamError::NonJson {
                status: *status,
                content_type: Some("text/html".to_string()),
            }),
        }
    }
}
