// ============================================================================
// Custody Infrastructure - PostgreSQL Session Repository
// File: crates/custody-infrastructure/src/database/postgres/session_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use custody_core::domain::Session;
use custody_core::error::DomainError;
use custody_core::repositories::SessionRepository;

use super::{storage_error, PgStore};

#[derive(Debug, FromRow)]
struct SessionRow {
    digest: String,
    owner: String,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl From<SessionRow> for Session {
    fn from(row: SessionRow) -> Self {
        Session {
            digest: row.digest,
            owner: row.owner,
            issued_at: row.issued_at,
            expires_at: row.expires_at,
        }
    }
}

#[async_trait]
impl SessionRepository for PgStore {
    async fn insert(&self, session: &Session) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO sessions (digest, owner, issued_at, expires_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&session.digest)
        .bind(&session.owner)
        .bind(session.issued_at)
        .bind(session.expires_at)
        .execute(self.pool())
        .await
        .map_err(|e| storage_error("inserting session", e))?;

        Ok(())
    }

    async fn find_active(&self, digest: &str, now: DateTime<Utc>) -> Result<Option<Session>, DomainError> {
        let row: Option<SessionRow> = sqlx::query_as(
            r#"
            SELECT digest, owner, issued_at, expires_at
            FROM sessions
            WHERE digest = $1 AND expires_at > $2
            "#,
        )
        .bind(digest)
        .bind(now)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| storage_error("finding session", e))?;

        Ok(row.map(Into::into))
    }

    async fn delete(&self, digest: &str) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM sessions WHERE digest = $1")
            .bind(digest)
            .execute(self.pool())
            .await
            .map_err(|e| storage_error("deleting session", e))?;

        Ok(())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, DomainError> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= $1")
            .bind(now)
            .execute(self.pool())
            .await
            .map_err(|e| storage_error("purging expired sessions", e))?;

        Ok(result.rows_affected())
    }
}
