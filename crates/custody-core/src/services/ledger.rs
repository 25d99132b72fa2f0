// ============================================================================
// Custody Core - Ledger
// File: crates/custody-core/src/services/ledger.rs
// ============================================================================
//! Account balances and their atomic mutation

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::{Account, BalanceChange};
use crate::error::DomainError;
use crate::repositories::AccountRepository;

/// Owns balance mutation. Serialization per account is delegated to the
/// repository's `apply`; amounts are checked here before any lookup.
pub struct Ledger<R: AccountRepository + ?Sized> {
    accounts: Arc<R>,
}

impl<R: AccountRepository + ?Sized> Ledger<R> {
    pub fn new(accounts: Arc<R>) -> Self {
        Self { accounts }
    }

    pub async fn deposit(&self, account_id: &str, amount: i64) -> Result<i64, DomainError> {
        let account = self.mutate(account_id, BalanceChange::Deposit(amount)).await?;
        info!(account_id, amount, balance = account.balance, "Deposit committed");
        Ok(account.balance)
    }

    pub async fn withdraw(&self, account_id: &str, amount: i64) -> Result<i64, DomainError> {
        let account = self.mutate(account_id, BalanceChange::Withdraw(amount)).await?;
        info!(account_id, amount, balance = account.balance, "Withdrawal committed");
        Ok(account.balance)
    }

    /// Point-in-time read.
    pub async fn balance(&self, account_id: &str) -> Result<i64, DomainError> {
        self.accounts
            .find_by_id(account_id)
            .await?
            .map(|account| account.balance)
            .ok_or(DomainError::AccountNotFound)
    }

    /// The single account owned by an authenticated user.
    pub async fn account_for_owner(&self, owner: &str) -> Result<Account, DomainError> {
        self.accounts
            .find_by_owner(owner)
            .await?
            .ok_or(DomainError::AccountNotFound)
    }

    async fn mutate(&self, account_id: &str, change: BalanceChange) -> Result<Account, DomainError> {
        if change.amount() <= 0 {
            debug!(account_id, amount = change.amount(), "Rejected non-positive amount");
            return Err(DomainError::InvalidAmount);
        }

        self.accounts.apply(account_id, change).await.map_err(|e| {
            match &e {
                DomainError::InsufficientBalance => {
                    warn!(account_id, amount = change.amount(), "Withdrawal exceeds balance")
                }
                DomainError::AccountNotFound => warn!(account_id, "Account not found"),
                _ => {}
            }
            e
        })
    }
}
