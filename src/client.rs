//! Typed client for the gateway routes.
//!
//! The client is what a front end calls: it reads identity from the shared
//! [`SessionContext`], checks onboarding forms before sending them, and turns
//! error bodies into one readable message.

use std::{sync::Arc, time::Duration};

use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;
use tumae_upstream::{envelope, Backend, UpstreamError, UpstreamRequest};

use crate::normalize::{self, MessageSummary};
use crate::onboarding::{self, OnboardingSelection, Role, Scalar, ValidationErrors};
use crate::session::{Session, SessionContext, SessionError};

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("you need to log in first")]
    NotLoggedIn,

    #[error("unexpected reply: {0}")]
    Decode(String),

    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Transport(#[from] UpstreamError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

#[derive(Debug, Clone, Serialize)]
pub struct Signup {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: Role,
}

pub struct ApiClient {
    gateway: Arc<dyn Backend>,
    session: Arc<SessionContext>,
    logout_timeout: Duration,
}

impl ApiClient {
    pub fn new(
        gateway: Arc<dyn Backend>,
        session: Arc<SessionContext>,
        logout_timeout: Duration,
    ) -> Self {
        Self {
            gateway,
            session,
            logout_timeout,
        }
    }

    pub fn session(&self) -> &Arc<SessionContext> {
        &self.session
    }

    fn require_session(&self) -> Result<Session, ClientError> {
        self.session.current().ok_or(ClientError::NotLoggedIn)
    }

    async fn call(&self, request: UpstreamRequest) -> Result<Value, ClientError> {
        let reply = self.gateway.send(request).await?;
        if reply.is_success() {
            return Ok(reply.body);
        }

        let message = envelope::error_message(&reply.body)
            .unwrap_or_else(|| format!("request failed with status {}", reply.status));
        Err(ClientError::Rejected {
            status: reply.status,
            message,
        })
    }

    pub async fn signup(&self, signup: &Signup) -> Result<Value, ClientError> {
        let body = serde_json::to_value(signup).map_err(|e| ClientError::Decode(e.to_string()))?;
        self.call(UpstreamRequest::post("/api/auth/signup").json(body))
            .await
    }

    /// Log in and make the result the current session.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, ClientError> {
        let body = self
            .call(
                UpstreamRequest::post("/api/auth/login")
                    .json(json!({"email": email, "password": password})),
            )
            .await?;

        let session = session_from_login(&envelope::unwrap_data(body), email)?;
        self.session.login(session.clone())?;
        Ok(session)
    }

    /// End the session. The local session is cleared even when the gateway
    /// cannot be reached or does not answer within the logout timeout.
    pub async fn logout(&self) -> Result<(), ClientError> {
        if let Some(session) = self.session.current() {
            let request = UpstreamRequest::post("/api/auth/logout")
                .json(json!({"refresh_token": session.refresh_token}))
                .bearer(Some(session.access_token))
                .timeout(self.logout_timeout);
            if let Err(e) = self.call(request).await {
                tracing::warn!(error = %e, "logout call failed; clearing local session anyway");
            }
        }
        self.session.logout()?;
        Ok(())
    }

    pub async fn delete_account(&self) -> Result<(), ClientError> {
        let session = self.require_session()?;
        self.call(
            UpstreamRequest::delete(format!("/api/auth/users/{}", session.user_id))
                .bearer(Some(session.access_token)),
        )
        .await?;
        self.session.logout()?;
        Ok(())
    }

    pub async fn inbox(&self) -> Result<Vec<MessageSummary>, ClientError> {
        self.mailbox("inbox").await
    }

    pub async fn sent(&self) -> Result<Vec<MessageSummary>, ClientError> {
        self.mailbox("sent").await
    }

    async fn mailbox(&self, name: &str) -> Result<Vec<MessageSummary>, ClientError> {
        let session = self.require_session()?;
        let body = self
            .call(
                UpstreamRequest::get(format!("/api/messages/{name}"))
                    .query("user_id", session.user_id.to_string())
                    .bearer(Some(session.access_token)),
            )
            .await?;
        Ok(normalize::message_list(body))
    }

    pub async fn community_posts(
        &self,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<Vec<Value>, ClientError> {
        let page = page.map(|p| p.to_string());
        let limit = limit.map(|l| l.to_string());
        let body = self
            .call(
                UpstreamRequest::get("/api/community/posts")
                    .query_opt("page", page.as_deref())
                    .query_opt("limit", limit.as_deref()),
            )
            .await?;
        Ok(envelope::extract_list(body))
    }

    pub async fn submit_tutor_onboarding(
        &self,
        selection: OnboardingSelection,
    ) -> Result<Value, ClientError> {
        self.submit_onboarding(Role::Tutor, selection).await
    }

    pub async fn submit_student_onboarding(
        &self,
        selection: OnboardingSelection,
    ) -> Result<Value, ClientError> {
        self.submit_onboarding(Role::Student, selection).await
    }

    /// Forms are checked locally first; a rejected form never leaves the
    /// client.
    async fn submit_onboarding(
        &self,
        role: Role,
        mut selection: OnboardingSelection,
    ) -> Result<Value, ClientError> {
        let session = self.require_session()?;
        if selection.user_id.is_none() {
            selection.user_id = Some(Scalar::Int(session.user_id as i64));
        }
        onboarding::aggregate(role, &selection)?;

        let body =
            serde_json::to_value(&selection).map_err(|e| ClientError::Decode(e.to_string()))?;
        self.call(
            UpstreamRequest::post(format!("/api/onboarding/{}", role.as_str()))
                .json(body)
                .bearer(Some(session.access_token)),
        )
        .await
    }
}

fn session_from_login(body: &Value, email: &str) -> Result<Session, ClientError> {
    let text = |keys: &[&str]| normalize::text_field(body, keys);

    let access_token = text(&["access_token", "token"])
        .ok_or_else(|| ClientError::Decode("login reply has no access_token".to_string()))?;
    let user_id = normalize::int_field(body, &["user_id", "id"])
        .and_then(|id| u64::try_from(id).ok())
        .ok_or_else(|| ClientError::Decode("login reply has no user_id".to_string()))?;
    let role = text(&["role", "user_role"])
        .ok_or_else(|| ClientError::Decode("login reply has no role".to_string()))?
        .parse()
        .map_err(ClientError::Decode)?;

    Ok(Session {
        user_id,
        access_token,
        refresh_token: text(&["refresh_token"]),
        role,
        name: text(&["name", "user_name"]),
        email: text(&["email", "user_email"]).or_else(|| Some(email.to_string())),
    })
}
