use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use super::error::ServiceResult;
use crate::auth::{generate_session_token, token_digest};
use crate::database::models::{SessionPayload, SessionRecord};
use crate::database::repository::SessionRepository;
use crate::types::UserId;

/// A freshly opened session; `token` goes into the cookie and nowhere else
#[derive(Debug, Clone, PartialEq)]
pub struct IssuedSession {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues and resolves server-side sessions with an absolute TTL
#[derive(Clone)]
pub struct SessionManager {
    sessions: Arc<dyn SessionRepository>,
    ttl: Duration,
}

impl SessionManager {
    pub fn new(sessions: Arc<dyn SessionRepository>, ttl_hours: i64) -> Self {
        Self {
            sessions,
            ttl: Duration::hours(ttl_hours),
        }
    }

    pub async fn open(&self, payload: SessionPayload) -> ServiceResult<IssuedSession> {
        let token = generate_session_token();
        let expires_at = Utc::now() + self.ttl;

        self.sessions
            .insert(&SessionRecord {
                token_digest: token_digest(&token),
                payload,
                expires_at,
            })
            .await?;

        debug!("Opened session for user {}", payload.user_id);
        Ok(IssuedSession { token, expires_at })
    }

    /// `None` for unknown or expired tokens. Activity does not extend the expiry.
    pub async fn resolve(&self, token: &str) -> ServiceResult<Option<SessionPayload>> {
        let session = self.sessions.find(&token_digest(token), Utc::now()).await?;
        Ok(session.map(|s| s.payload))
    }

    /// Idempotent
    pub async fn close(&self, token: &str) -> ServiceResult<()> {
        self.sessions.delete(&token_digest(token)).await?;
        Ok(())
    }

    pub async fn close_all_for(&self, user: UserId) -> ServiceResult<u64> {
        Ok(self.sessions.delete_for_user(user).await?)
    }

    pub async fn purge_expired(&self) -> ServiceResult<u64> {
        Ok(self.sessions.purge_expired(Utc::now()).await?)
    }
}
