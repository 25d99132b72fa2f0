// ============================================================================
// Custody Infrastructure - PostgreSQL Account Repository
// File: crates/custody-infrastructure/src/database/postgres/account_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use custody_core::domain::{Account, BalanceChange};
use custody_core::error::DomainError;
use custody_core::repositories::AccountRepository;

use super::{storage_error, PgStore};

#[derive(Debug, FromRow)]
struct AccountRow {
    id: String,
    owner: String,
    balance: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Account {
            id: row.id,
            owner: row.owner,
            balance: row.balance,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl AccountRepository for PgStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<Account>, DomainError> {
        let row: Option<AccountRow> = sqlx::query_as(
            r#"
            SELECT id, owner, balance, created_at, updated_at
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| storage_error("finding account by id", e))?;

        Ok(row.map(Into::into))
    }

    async fn find_by_owner(&self, owner: &str) -> Result<Option<Account>, DomainError> {
        let row: Option<AccountRow> = sqlx::query_as(
            r#"
            SELECT id, owner, balance, created_at, updated_at
            FROM accounts
            WHERE owner = $1
            "#,
        )
        .bind(owner)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| storage_error("finding account by owner", e))?;

        Ok(row.map(Into::into))
    }

    async fn apply(&self, id: &str, change: BalanceChange) -> Result<Account, DomainError> {
        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(|e| storage_error("starting balance update", e))?;

        // Row lock: concurrent changes to this account queue here.
        let row: Option<AccountRow> = sqlx::query_as(
            r#"
            SELECT id, owner, balance, created_at, updated_at
            FROM accounts
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| storage_error("locking account", e))?;

        let mut account: Account = row.ok_or(DomainError::AccountNotFound)?.into();
        change.apply_to(&mut account)?;

        sqlx::query(
            r#"
            UPDATE accounts
            SET balance = $2, updated_at = $3
            WHERE id = $1
            "#,
        )
        .bind(&account.id)
        .bind(account.balance)
        .bind(account.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| storage_error("updating balance", e))?;

        tx.commit()
            .await
            .map_err(|e| storage_error("committing balance update", e))?;

        Ok(account)
    }
}
