//! Account repository trait (port)

use async_trait::async_trait;

use crate::domain::{Account, BalanceChange};
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<Account>, DomainError>;

    async fn find_by_owner(&self, owner: &str) -> Result<Option<Account>, DomainError>;

    /// Read-modify-write of one account, serialized against every other
    /// change to the same account. Returns the committed state.
    ///
    /// On any error nothing is written.
    async fn apply(&self, id: &str, change: BalanceChange) -> Result<Account, DomainError>;
}
