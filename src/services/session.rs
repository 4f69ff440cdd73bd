use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::AdminCredentials;
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: Uuid,
    pub username: String,
    pub login_time: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Admin sessions, shared through the router state.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
    ttl: TimeDelta,
}

impl SessionStore {
    pub fn new(ttl: TimeDelta) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Opens a session when `username`/`password` match the configured admin.
    pub async fn login(
        &self,
        admin: &AdminCredentials,
        username: &str,
        password: &str,
    ) -> Result<Session, AppError> {
        if username != admin.username || password != admin.password {
            warn!("rejected admin login for {:?}", username);
            return Err(AppError::Unauthorized);
        }

        let login_time = Utc::now();
        let session = Session {
            token: Uuid::new_v4(),
            username: username.to_string(),
            login_time,
            expires_at: login_time + self.ttl,
        };
        self.sessions.write().await.insert(session.token, session.clone());
        info!("admin {} logged in", username);
        Ok(session)
    }

    /// Returns the live session for `token`. Expired sessions are dropped.
    pub async fn validate(&self, token: &Uuid) -> Result<Session, AppError> {
        let now = Utc::now();
        let session = self
            .sessions
            .read()
            .await
            .get(token)
            .cloned()
            .ok_or(AppError::Unauthorized)?;

        if session.is_expired_at(now) {
            self.sessions.write().await.remove(token);
            info!("admin session for {} expired", session.username);
            return Err(AppError::Unauthorized);
        }
        Ok(session)
    }

    pub async fn revoke(&self, token: &Uuid) -> bool {
        self.sessions.write().await.remove(token).is_some()
    }

    /// Removes every expired session and returns how many were dropped.
    pub async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired_at(now));
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
