use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{types::Json, PgPool, Row};
use tracing::debug;

use super::{DbResult, SessionRepository};
use crate::database::models::{SessionPayload, SessionRecord};
use crate::types::UserId;

pub struct PgSessionRepository {
    pool: PgPool,
}

impl PgSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for PgSessionRepository {
    async fn insert(&self, session: &SessionRecord) -> DbResult<()> {
        sqlx::query("INSERT INTO sessions (sid, sess, expire) VALUES ($1, $2, $3)")
            .bind(&session.token_digest)
            .bind(Json(session.payload))
            .bind(session.expires_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find(&self, token_digest: &str, now: DateTime<Utc>) -> DbResult<Option<SessionRecord>> {
        let Some(row) = sqlx::query("SELECT sid, sess, expire FROM sessions WHERE sid = $1")
            .bind(token_digest)
            .fetch_optional(&self.pool)
            .await?
        else {
            return Ok(None);
        };

        let Json(payload): Json<SessionPayload> = row.try_get("sess")?;
        let session = SessionRecord {
            token_digest: row.try_get("sid")?,
            payload,
            expires_at: row.try_get("expire")?,
        };

        if session.is_expired(now) {
            debug!("Dropping expired session for user {}", session.payload.user_id);
            self.delete(token_digest).await?;
            return Ok(None);
        }

        Ok(Some(session))
    }

    async fn delete(&self, token_digest: &str) -> DbResult<()> {
        sqlx::query("DELETE FROM sessions WHERE sid = $1")
            .bind(token_digest)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_for_user(&self, user: UserId) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE sess->>'userId' = $1")
            .bind(user.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expire <= $1")
            .bind(now)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
