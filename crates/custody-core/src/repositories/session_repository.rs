//! Session repository trait (port)

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::Session;
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn insert(&self, session: &Session) -> Result<(), DomainError>;

    /// Only sessions with `now < expires_at` are returned.
    async fn find_active(&self, digest: &str, now: DateTime<Utc>) -> Result<Option<Session>, DomainError>;

    /// Idempotent.
    async fn delete(&self, digest: &str) -> Result<(), DomainError>;

    /// Returns how many sessions were removed.
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, DomainError>;
}
