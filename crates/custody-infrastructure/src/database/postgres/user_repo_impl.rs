// ============================================================================
// Custody Infrastructure - PostgreSQL User Repository
// File: crates/custody-infrastructure/src/database/postgres/user_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use tracing::{info, warn};

use custody_core::domain::{Account, User};
use custody_core::error::DomainError;
use custody_core::repositories::UserRepository;

use super::{is_unique_violation, storage_error, PgStore};

// Internal row type for SQLx mapping
#[derive(Debug, FromRow)]
struct UserRow {
    id: String,
    secret_hash: String,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            secret_hash: row.secret_hash,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, DomainError> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT id, secret_hash, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| storage_error("finding user by id", e))?;

        Ok(row.map(Into::into))
    }

    async fn create_with_account(&self, user: &User, account: &Account) -> Result<(), DomainError> {
        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(|e| storage_error("starting registration", e))?;

        // Dropping `tx` on any early return rolls both inserts back.
        sqlx::query(
            r#"
            INSERT INTO users (id, secret_hash, created_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(&user.id)
        .bind(&user.secret_hash)
        .bind(user.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                warn!("User already exists: {}", user.id);
                DomainError::AlreadyExists(user.id.clone())
            } else {
                storage_error("creating user", e)
            }
        })?;

        sqlx::query(
            r#"
            INSERT INTO accounts (id, owner, balance, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&account.id)
        .bind(&account.owner)
        .bind(account.balance)
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| storage_error("creating account", e))?;

        tx.commit()
            .await
            .map_err(|e| storage_error("committing registration", e))?;

        info!("User {} created with account {}", user.id, account.id);
        Ok(())
    }
}
