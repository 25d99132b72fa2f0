//! User repository trait (port)

use async_trait::async_trait;

use crate::domain::{Account, User};
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, DomainError>;

    /// Creates the user and its account as one unit: both or neither.
    ///
    /// Fails with `AlreadyExists` when the user id is taken.
    async fn create_with_account(&self, user: &User, account: &Account) -> Result<(), DomainError>;
}
