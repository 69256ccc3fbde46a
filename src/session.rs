//! The signed-in user, held explicitly and shared by `Arc`.
//!
//! Components that care about sign-in changes subscribe to the context
//! instead of polling storage. A [`SessionStore`] keeps the session across
//! process restarts.

use std::{
    path::{Path, PathBuf},
    sync::RwLock,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tumae_events::{EventBus, Subscription};

use crate::onboarding::Role;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: u64,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub role: Role,
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    LoggedIn(Session),
    LoggedOut,
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("failed to access session file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("session file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("stored session is invalid: {0}")]
    Invalid(String),
}

/// On-disk layout, one key per stored value.
#[derive(Debug, Serialize, Deserialize)]
struct StoredSession {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    user_id: String,
    user_role: String,
    #[serde(default)]
    user_name: Option<String>,
    #[serde(default)]
    user_email: Option<String>,
}

impl From<&Session> for StoredSession {
    fn from(session: &Session) -> Self {
        Self {
            access_token: session.access_token.clone(),
            refresh_token: session.refresh_token.clone(),
            user_id: session.user_id.to_string(),
            user_role: session.role.as_str().to_string(),
            user_name: session.name.clone(),
            user_email: session.email.clone(),
        }
    }
}

impl TryFrom<StoredSession> for Session {
    type Error = SessionError;

    fn try_from(stored: StoredSession) -> Result<Self, Self::Error> {
        let user_id = stored
            .user_id
            .trim()
            .parse()
            .map_err(|_| SessionError::Invalid(format!("user_id '{}' is not a number", stored.user_id)))?;
        let role = stored.user_role.parse().map_err(SessionError::Invalid)?;

        Ok(Self {
            user_id,
            access_token: stored.access_token,
            refresh_token: stored.refresh_token,
            role,
            name: stored.user_name,
            email: stored.user_email,
        })
    }
}

/// JSON file holding the current session.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The stored session, or `None` when nothing is stored.
    pub fn load(&self) -> Result<Option<Session>, SessionError> {
        let raw = match std::fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(SessionError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let stored: StoredSession =
            serde_json::from_slice(&raw).map_err(|source| SessionError::Corrupt {
                path: self.path.clone(),
                source,
            })?;
        Session::try_from(stored).map(Some)
    }

    pub fn save(&self, session: &Session) -> Result<(), SessionError> {
        let io_error = |source| SessionError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_error)?;
        }
        let json = serde_json::to_vec_pretty(&StoredSession::from(session)).map_err(|source| {
            SessionError::Corrupt {
                path: self.path.clone(),
                source,
            }
        })?;
        std::fs::write(&self.path, json).map_err(io_error)
    }

    /// Remove the stored session; clearing an empty store is fine.
    pub fn clear(&self) -> Result<(), SessionError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(SessionError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

/// Current session plus change notifications.
pub struct SessionContext {
    current: RwLock<Option<Session>>,
    events: EventBus<SessionEvent>,
    store: Option<SessionStore>,
}

impl SessionContext {
    /// A context that keeps the session in memory only.
    pub fn in_memory() -> Self {
        Self {
            current: RwLock::new(None),
            events: EventBus::new(),
            store: None,
        }
    }

    /// A context backed by `store`, starting from whatever it holds.
    pub fn with_store(store: SessionStore) -> Result<Self, SessionError> {
        let current = store.load()?;
        if let Some(session) = &current {
            tracing::debug!(user_id = session.user_id, "restored session");
        }
        Ok(Self {
            current: RwLock::new(current),
            events: EventBus::new(),
            store: Some(store),
        })
    }

    pub fn current(&self) -> Option<Session> {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.current().is_some()
    }

    /// Replace the current session, persist it, and notify subscribers.
    pub fn login(&self, session: Session) -> Result<(), SessionError> {
        if let Some(store) = &self.store {
            store.save(&session)?;
        }
        tracing::info!(user_id = session.user_id, role = session.role.as_str(), "logged in");

        *self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(session.clone());
        self.events.publish(SessionEvent::LoggedIn(session));
        Ok(())
    }

    /// Drop the current session. Subscribers hear about it only when there
    /// was one.
    pub fn logout(&self) -> Result<(), SessionError> {
        if let Some(store) = &self.store {
            store.clear()?;
        }

        let previous = self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(session) = previous {
            tracing::info!(user_id = session.user_id, "logged out");
            self.events.publish(SessionEvent::LoggedOut);
        }
        Ok(())
    }

    pub fn subscribe(&self) -> Subscription<SessionEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session {
            user_id: 12,
            access_token: "access".into(),
            refresh_token: Some("refresh".into()),
            role: Role::Tutor,
            name: Some("김코딩".into()),
            email: Some("tutor@example.com".into()),
        }
    }

    fn temp_store() -> SessionStore {
        let dir = std::env::temp_dir().join(format!("tumae-session-{}", uuid::Uuid::new_v4()));
        SessionStore::new(dir.join("session.json"))
    }

    #[test]
    fn store_uses_flat_keys() {
        let store = temp_store();
        store.save(&session()).unwrap();

        let raw: serde_json::Value =
            serde_json::from_slice(&std::fs::read(store.path()).unwrap()).unwrap();
        assert_eq!(raw["user_id"], "12");
        assert_eq!(raw["user_role"], "tutor");
        assert_eq!(raw["user_name"], "김코딩");
        assert_eq!(raw["access_token"], "access");

        assert_eq!(store.load().unwrap(), Some(session()));
        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        store.clear().unwrap();
    }

    #[test]
    fn corrupt_file_is_reported() {
        let store = temp_store();
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), b"not json").unwrap();

        assert!(matches!(store.load(), Err(SessionError::Corrupt { .. })));
    }

    #[test]
    fn unknown_role_is_invalid() {
        let store = temp_store();
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(
            store.path(),
            br#"{"access_token": "a", "user_id": "1", "user_role": "admin"}"#,
        )
        .unwrap();

        assert!(matches!(store.load(), Err(SessionError::Invalid(_))));
    }

    #[tokio::test]
    async fn subscribers_see_login_and_logout() {
        let context = SessionContext::in_memory();
        let mut events = context.subscribe();

        context.login(session()).unwrap();
        assert_eq!(events.recv().await, Some(SessionEvent::LoggedIn(session())));
        assert_eq!(context.current().map(|s| s.user_id), Some(12));

        context.logout().unwrap();
        assert_eq!(events.recv().await, Some(SessionEvent::LoggedOut));
        assert!(!context.is_logged_in());

        // a second logout has nothing to announce
        context.logout().unwrap();
        assert_eq!(events.try_recv(), None);
    }

    #[test]
    fn context_restores_from_store() {
        let store = temp_store();
        store.save(&session()).unwrap();

        let context = SessionContext::with_store(store.clone()).unwrap();
        assert_eq!(context.current(), Some(session()));

        context.logout().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }
}
