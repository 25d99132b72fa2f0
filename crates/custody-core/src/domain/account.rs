//! Account domain entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AccountId, UserId};
use crate::error::DomainError;

/// A single balance owned by exactly one user.
///
/// # Invariants
/// - `balance >= 0` after every committed operation.
/// - `id` and `owner` never change after creation.
/// - A rejected operation leaves the account untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub owner: UserId,
    pub balance: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Zero-balance account for a freshly registered user.
    pub fn new(owner: impl Into<UserId>) -> Self {
        Self::seeded(Uuid::new_v4().to_string(), owner, 0)
    }

    /// Account with a fixed id and opening balance (process-start seeding).
    pub fn seeded(id: impl Into<AccountId>, owner: impl Into<UserId>, balance: i64) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            owner: owner.into(),
            balance: balance.max(0),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn deposit(&mut self, amount: i64) -> Result<i64, DomainError> {
        if amount <= 0 {
            return Err(DomainError::InvalidAmount);
        }
        let balance = self
            .balance
            .checked_add(amount)
            .ok_or(DomainError::InvalidAmount)?;
        self.commit(balance);
        Ok(balance)
    }

    pub fn withdraw(&mut self, amount: i64) -> Result<i64, DomainError> {
        if amount <= 0 {
            return Err(DomainError::InvalidAmount);
        }
        if amount > self.balance {
            return Err(DomainError::InsufficientBalance);
        }
        let balance = self.balance - amount;
        self.commit(balance);
        Ok(balance)
    }

    pub fn balance(&self) -> i64 {
        self.balance
    }

    fn commit(&mut self, balance: i64) {
        self.balance = balance;
        self.updated_at = Utc::now();
    }
}

/// A mutation a repository applies atomically to one account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceChange {
    Deposit(i64),
    Withdraw(i64),
}

impl BalanceChange {
    pub fn amount(&self) -> i64 {
        match self {
            BalanceChange::Deposit(amount) | BalanceChange::Withdraw(amount) => *amount,
        }
    }

    pub fn apply_to(&self, account: &mut Account) -> Result<i64, DomainError> {
        match *self {
            BalanceChange::Deposit(amount) => account.deposit(amount),
            BalanceChange::Withdraw(amount) => account.withdraw(amount),
        }
    }
}
