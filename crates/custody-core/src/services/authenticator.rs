// ============================================================================
// Custody Core - Session Authenticator
// File: crates/custody-core/src/services/authenticator.rs
// ============================================================================
//! Registration, login, and bearer token lifecycle

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, error, info, warn};

use custody_security::password::{PasswordError, PasswordService};
use custody_shared::constants::DEFAULT_SESSION_TTL_HOURS;

use crate::domain::{Account, AccountId, Credentials, IssuedToken, User, UserId};
use crate::error::DomainError;
use crate::repositories::UserRepository;
use crate::services::token_strategy::TokenStrategy;

/// Verifies identities and answers "is this token valid, and for whom".
///
/// Shares no state with the ledger; its only output on the request path is
/// the resolved user id.
pub struct SessionAuthenticator<U, T>
where
    U: UserRepository + ?Sized,
    T: TokenStrategy + ?Sized,
{
    users: Arc<U>,
    tokens: Arc<T>,
    ttl: Duration,
}

/// Result of a successful registration
#[derive(Debug, Clone)]
pub struct Registration {
    pub user_id: UserId,
    pub account_id: AccountId,
}

impl<U, T> SessionAuthenticator<U, T>
where
    U: UserRepository + ?Sized,
    T: TokenStrategy + ?Sized,
{
    pub fn new(users: Arc<U>, tokens: Arc<T>) -> Self {
        Self {
            users,
            tokens,
            ttl: Duration::hours(DEFAULT_SESSION_TTL_HOURS),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Register a new user together with a zero-balance account
    pub async fn register(&self, user_id: &str, secret: &str) -> Result<Registration, DomainError> {
        let credentials = Credentials::parse(user_id, secret)?;
        info!("Registration attempt for user: {}", credentials.user_id);

        // 1. Cheap rejection; the repository still enforces uniqueness
        if self.users.find_by_id(credentials.user_id).await?.is_some() {
            warn!("Registration failed: user already exists: {}", credentials.user_id);
            return Err(DomainError::AlreadyExists(credentials.user_id.to_string()));
        }

        // 2. Hash password off the async executor
        let secret_hash = hash_secret(credentials.secret.to_string()).await?;

        // 3. User and account land together or not at all
        let user = User::new(credentials.user_id, secret_hash);
        let account = Account::new(credentials.user_id);
        self.users.create_with_account(&user, &account).await?;

        info!("Registration successful for: {}", user.id);
        Ok(Registration {
            user_id: user.id,
            account_id: account.id,
        })
    }

    pub async fn login(&self, user_id: &str, secret: &str) -> Result<IssuedToken, DomainError> {
        self.login_at(user_id, secret, Utc::now()).await
    }

    /// Login with an explicit clock reading
    pub async fn login_at(
        &self,
        user_id: &str,
        secret: &str,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, DomainError> {
        info!("Login attempt for user: {}", user_id);

        let Some(user) = self.users.find_by_id(user_id).await? else {
            // Same cost as a real verification; same error as a wrong secret.
            burn_verification(secret.to_string()).await;
            warn!("Login failed: unknown user: {}", user_id);
            return Err(DomainError::InvalidCredentials);
        };

        if !verify_secret(secret.to_string(), user.secret_hash.clone()).await? {
            warn!("Login failed: invalid password for: {}", user_id);
            return Err(DomainError::InvalidCredentials);
        }

        let issued = self.tokens.issue(&user.id, now, self.ttl).await?;
        info!("Login successful for: {} (expires {})", user.id, issued.expires_at);
        Ok(issued)
    }

    pub async fn validate(&self, token: &str) -> Result<UserId, DomainError> {
        self.validate_at(token, Utc::now()).await
    }

    /// Resolves a bearer token to its owner, or `Unauthorized`
    pub async fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<UserId, DomainError> {
        if token.is_empty() {
            return Err(DomainError::Unauthorized);
        }
        match self.tokens.resolve(token, now).await? {
            Some(owner) => Ok(owner),
            None => {
                debug!("Token rejected");
                Err(DomainError::Unauthorized)
            }
        }
    }

    /// Idempotent: unknown, expired, or malformed tokens are not an error
    pub async fn revoke(&self, token: &str) -> Result<(), DomainError> {
        self.tokens.revoke(token).await?;
        debug!("Token revoked");
        Ok(())
    }

    /// False when the token strategy cannot end a session before expiry.
    pub fn revocable(&self) -> bool {
        self.tokens.revocable()
    }

    pub async fn purge_expired(&self) -> Result<u64, DomainError> {
        self.purge_expired_at(Utc::now()).await
    }

    pub async fn purge_expired_at(&self, now: DateTime<Utc>) -> Result<u64, DomainError> {
        self.tokens.purge_expired(now).await
    }
}

async fn hash_secret(secret: String) -> Result<String, DomainError> {
    tokio::task::spawn_blocking(move || PasswordService::hash(&secret))
        .await
        .map_err(|e| DomainError::InternalError(e.to_string()))?
        .map_err(|e| {
            error!("Password hashing failed: {}", e);
            DomainError::InternalError(e.to_string())
        })
}

async fn verify_secret(secret: String, hash: String) -> Result<bool, DomainError> {
    let verified = tokio::task::spawn_blocking(move || PasswordService::verify(&secret, &hash))
        .await
        .map_err(|e| DomainError::InternalError(e.to_string()))?;

    match verified {
        Ok(valid) => Ok(valid),
        Err(PasswordError::HashError(e)) => {
            // Corrupt stored hash: the user cannot log in, and must not learn why.
            error!("Stored password hash unreadable: {}", e);
            Ok(false)
        }
        Err(PasswordError::VerificationFailed) => Ok(false),
    }
}

async fn burn_verification(secret: String) {
    let _ = tokio::task::spawn_blocking(move || PasswordService::verify_dummy(&secret)).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::{MockSessionRepository, MockUserRepository};
    use crate::services::token_strategy::StoredSessions;

    fn stored_sessions() -> Arc<StoredSessions<MockSessionRepository>> {
        let mut sessions = MockSessionRepository::new();
        sessions.expect_insert().returning(|_| Ok(()));
        Arc::new(StoredSessions::new(Arc::new(sessions)))
    }

    #[tokio::test]
    async fn test_register_rejects_empty_input_before_storage() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().never();
        users.expect_create_with_account().never();
        let auth = SessionAuthenticator::new(Arc::new(users), stored_sessions());

        assert!(matches!(auth.register("", "pw").await, Err(DomainError::InvalidInput(_))));
        assert!(matches!(auth.register("alice", "").await, Err(DomainError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_register_hashes_and_creates_both_records() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(|_| Ok(None));
        users
            .expect_create_with_account()
            .times(1)
            .withf(|user, account| {
                user.id == "alice"
                    && user.secret_hash.starts_with("$argon2")
                    && account.owner == "alice"
                    && account.balance == 0
            })
            .returning(|_, _| Ok(()));
        let auth = SessionAuthenticator::new(Arc::new(users), stored_sessions());

        let registration = auth.register("alice", "pw").await.unwrap();
        assert_eq!(registration.user_id, "alice");
        assert!(!registration.account_id.is_empty());
    }

    #[tokio::test]
    async fn test_register_surfaces_storage_failure_without_retry() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(|_| Ok(None));
        users
            .expect_create_with_account()
            .times(1)
            .returning(|_, _| Err(DomainError::StorageUnavailable("disk full".into())));
        let auth = SessionAuthenticator::new(Arc::new(users), stored_sessions());

        assert_eq!(
            auth.register("alice", "pw").await.unwrap_err(),
            DomainError::StorageUnavailable("disk full".into())
        );
    }

    #[tokio::test]
    async fn test_login_errors_are_indistinguishable() {
        let hash = PasswordService::hash("pw").unwrap();
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(move |id| {
            Ok((id == "alice").then(|| User::new("alice", hash.clone())))
        });
        let mut sessions = MockSessionRepository::new();
        sessions.expect_insert().never();
        let auth = SessionAuthenticator::new(
            Arc::new(users),
            Arc::new(StoredSessions::new(Arc::new(sessions))),
        );

        let unknown = auth.login("mallory", "pw").await.unwrap_err();
        let wrong = auth.login("alice", "nope").await.unwrap_err();
        assert_eq!(unknown, DomainError::InvalidCredentials);
        assert_eq!(unknown, wrong);
        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[tokio::test]
    async fn test_corrupt_hash_reads_as_invalid_credentials() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .returning(|_| Ok(Some(User::new("alice", "garbage".into()))));
        let auth = SessionAuthenticator::new(Arc::new(users), stored_sessions());

        assert_eq!(
            auth.login("alice", "pw").await.unwrap_err(),
            DomainError::InvalidCredentials
        );
    }

    #[tokio::test]
    async fn test_login_uses_configured_ttl() {
        let hash = PasswordService::hash("pw").unwrap();
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .returning(move |_| Ok(Some(User::new("alice", hash.clone()))));
        let auth = SessionAuthenticator::new(Arc::new(users), stored_sessions())
            .with_ttl(Duration::minutes(5));

        let issued = auth.login("alice", "pw").await.unwrap();
        assert_eq!(issued.expires_at - issued.issued_at, Duration::minutes(5));
        assert_eq!(issued.owner, "alice");
    }

    #[tokio::test]
    async fn test_validate_rejects_empty_token() {
        let users = MockUserRepository::new();
        let auth = SessionAuthenticator::new(Arc::new(users), stored_sessions());
        assert_eq!(auth.validate("").await, Err(DomainError::Unauthorized));
        assert_eq!(auth.validate("not-a-token").await, Err(DomainError::Unauthorized));
    }
}
