//! Bearer token strategies: stateful (stored) and stateless (signed)

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use custody_security::{jwt::JwtService, token};

use crate::domain::{IssuedToken, Session, UserId};
use crate::error::DomainError;
use crate::repositories::SessionRepository;

/// How tokens are minted, checked, and retired.
///
/// `resolve` returns `None` for any token that must not authenticate;
/// callers turn that into `Unauthorized` without saying why.
#[async_trait]
pub trait TokenStrategy: Send + Sync {
    async fn issue(&self, owner: &str, now: DateTime<Utc>, ttl: Duration) -> Result<IssuedToken, DomainError>;

    async fn resolve(&self, token: &str, now: DateTime<Utc>) -> Result<Option<UserId>, DomainError>;

    async fn revoke(&self, token: &str) -> Result<(), DomainError>;

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, DomainError>;

    /// Whether `revoke` ends a token's validity before it expires.
    fn revocable(&self) -> bool {
        true
    }
}

/// Opaque random tokens tracked in a `SessionRepository` by digest.
pub struct StoredSessions<R: SessionRepository + ?Sized> {
    sessions: Arc<R>,
}

impl<R: SessionRepository + ?Sized> StoredSessions<R> {
    pub fn new(sessions: Arc<R>) -> Self {
        Self { sessions }
    }
}

#[async_trait]
impl<R: SessionRepository + ?Sized> TokenStrategy for StoredSessions<R> {
    async fn issue(&self, owner: &str, now: DateTime<Utc>, ttl: Duration) -> Result<IssuedToken, DomainError> {
        let value = token::generate_session_token();
        let session = Session {
            digest: token::token_digest(&value),
            owner: owner.to_string(),
            issued_at: now,
            expires_at: now + ttl,
        };
        self.sessions.insert(&session).await?;

        Ok(IssuedToken {
            token: value,
            owner: session.owner,
            issued_at: session.issued_at,
            expires_at: session.expires_at,
        })
    }

    async fn resolve(&self, value: &str, now: DateTime<Utc>) -> Result<Option<UserId>, DomainError> {
        if !token::is_well_formed(value) {
            return Ok(None);
        }
        let session = self
            .sessions
            .find_active(&token::token_digest(value), now)
            .await?;

        // Expiry is decided here too, whatever the store filtered.
        Ok(session
            .filter(|s| !s.is_expired(now))
            .map(|s| s.owner))
    }

    async fn revoke(&self, value: &str) -> Result<(), DomainError> {
        if !token::is_well_formed(value) {
            return Ok(());
        }
        self.sessions.delete(&token::token_digest(value)).await
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, DomainError> {
        self.sessions.delete_expired(now).await
    }
}

/// Self-contained HS256 tokens. Nothing is stored, so nothing can be
/// revoked before expiry.
pub struct SignedSessions {
    jwt: JwtService,
}

impl SignedSessions {
    pub fn new(secret: &str) -> Self {
        Self {
            jwt: JwtService::new(secret),
        }
    }
}

#[async_trait]
impl TokenStrategy for SignedSessions {
    async fn issue(&self, owner: &str, now: DateTime<Utc>, ttl: Duration) -> Result<IssuedToken, DomainError> {
        let (value, claims) = self
            .jwt
            .generate_token(owner, now, ttl)
            .map_err(|e| DomainError::InternalError(e.to_string()))?;

        // Claims carry whole seconds; report exactly what the token encodes.
        let issued_at = from_claim(claims.iat)?;
        let expires_at = from_claim(claims.exp)?;

        Ok(IssuedToken {
            token: value,
            owner: claims.sub,
            issued_at,
            expires_at,
        })
    }

    async fn resolve(&self, value: &str, now: DateTime<Utc>) -> Result<Option<UserId>, DomainError> {
        match self.jwt.validate_token(value, now) {
            Ok(claims) => Ok(Some(claims.sub)),
            Err(e) => {
                debug!("Rejected signed token: {}", e);
                Ok(None)
            }
        }
    }

    async fn revoke(&self, _value: &str) -> Result<(), DomainError> {
        debug!("Signed tokens cannot be revoked; ignoring");
        Ok(())
    }

    fn revocable(&self) -> bool {
        false
    }

    async fn purge_expired(&self, _now: DateTime<Utc>) -> Result<u64, DomainError> {
        Ok(0)
    }
}

fn from_claim(seconds: i64) -> Result<DateTime<Utc>, DomainError> {
    DateTime::from_timestamp(seconds, 0)
        .ok_or_else(|| DomainError::InternalError(format!("timestamp out of range: {}", seconds)))
}
