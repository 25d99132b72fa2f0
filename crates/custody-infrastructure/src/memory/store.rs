//! In-process storage backed by concurrent maps.
//!
//! Each account sits behind its own mutex, so changes to one account are
//! serialized while different accounts proceed in parallel.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use custody_core::domain::{Account, AccountId, BalanceChange, Session, User, UserId};
use custody_core::error::DomainError;
use custody_core::repositories::{AccountRepository, SessionRepository, UserRepository};
use custody_shared::config::SeedAccount;

#[derive(Default)]
pub struct MemoryStore {
    users: DashMap<UserId, User>,
    accounts: DashMap<AccountId, Arc<Mutex<Account>>>,
    owners: DashMap<UserId, AccountId>,
    sessions: DashMap<String, Session>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with the configured startup accounts.
    pub fn with_seed_accounts(seeds: &[SeedAccount]) -> Result<Self, DomainError> {
        let store = Self::new();
        for seed in seeds {
            store.seed_account(Account::seeded(seed.id.as_str(), seed.owner.as_str(), seed.balance))?;
        }
        Ok(store)
    }

    /// Installs an account without a user record (process-start seeding).
    pub fn seed_account(&self, account: Account) -> Result<(), DomainError> {
        let id = account.id.clone();
        self.insert_account(account)?;
        info!("Seeded account {}", id);
        Ok(())
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    // Lock order: users entry, then owners entry, then accounts entry.
    fn insert_account(&self, account: Account) -> Result<(), DomainError> {
        let owner_slot = match self.owners.entry(account.owner.clone()) {
            Entry::Occupied(_) => {
                return Err(DomainError::StorageUnavailable(format!(
                    "owner {} already holds an account",
                    account.owner
                )))
            }
            Entry::Vacant(slot) => slot,
        };
        match self.accounts.entry(account.id.clone()) {
            Entry::Occupied(_) => Err(DomainError::StorageUnavailable(format!(
                "account id {} already in use",
                account.id
            ))),
            Entry::Vacant(slot) => {
                owner_slot.insert(account.id.clone());
                slot.insert(Arc::new(Mutex::new(account)));
                Ok(())
            }
        }
    }

    fn account_handle(&self, id: &str) -> Option<Arc<Mutex<Account>>> {
        self.accounts.get(id).map(|entry| Arc::clone(entry.value()))
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, DomainError> {
        Ok(self.users.get(id).map(|entry| entry.value().clone()))
    }

    async fn create_with_account(&self, user: &User, account: &Account) -> Result<(), DomainError> {
        // Holding the vacant user slot keeps the id invisible until the
        // account is in place.
        match self.users.entry(user.id.clone()) {
            Entry::Occupied(_) => {
                warn!("User already exists: {}", user.id);
                Err(DomainError::AlreadyExists(user.id.clone()))
            }
            Entry::Vacant(slot) => {
                self.insert_account(account.clone())?;
                slot.insert(user.clone());
                debug!("User {} created with account {}", user.id, account.id);
                Ok(())
            }
        }
    }
}

#[async_trait]
impl AccountRepository for MemoryStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<Account>, DomainError> {
        Ok(self.account_handle(id).map(|handle| handle.lock().clone()))
    }

    async fn find_by_owner(&self, owner: &str) -> Result<Option<Account>, DomainError> {
        let Some(id) = self.owners.get(owner).map(|entry| entry.value().clone()) else {
            return Ok(None);
        };
        AccountRepository::find_by_id(self, &id).await
    }

    async fn apply(&self, id: &str, change: BalanceChange) -> Result<Account, DomainError> {
        let handle = self.account_handle(id).ok_or(DomainError::AccountNotFound)?;
        let mut account = handle.lock();
        change.apply_to(&mut account)?;
        Ok(account.clone())
    }
}

#[async_trait]
impl SessionRepository for MemoryStore {
    async fn insert(&self, session: &Session) -> Result<(), DomainError> {
        self.sessions.insert(session.digest.clone(), session.clone());
        Ok(())
    }

    async fn find_active(&self, digest: &str, now: DateTime<Utc>) -> Result<Option<Session>, DomainError> {
        Ok(self
            .sessions
            .get(digest)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.value().clone()))
    }

    async fn delete(&self, digest: &str) -> Result<(), DomainError> {
        self.sessions.remove(digest);
        Ok(())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, DomainError> {
        let mut removed = 0u64;
        self.sessions.retain(|_, session| {
            let keep = !session.is_expired(now);
            if !keep {
                removed += 1;
            }
            keep
        });
        if removed > 0 {
            debug!("Purged {} expired sessions", removed);
        }
        Ok(removed)
    }
}
