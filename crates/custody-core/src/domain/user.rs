//! User domain entity

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use custody_shared::constants::MAX_USER_ID_LENGTH;

use super::UserId;
use crate::error::DomainError;

// validator compares lengths as u64.
const USER_ID_MAX_LEN: u64 = MAX_USER_ID_LENGTH as u64;

/// Stored credential record. Holds only the password hash.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub secret_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(id: impl Into<UserId>, secret_hash: String) -> Self {
        Self {
            id: id.into(),
            secret_hash,
            created_at: Utc::now(),
        }
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("secret_hash", &"<redacted>")
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Plaintext login input, checked before any hashing or lookup.
#[derive(Validate)]
pub struct Credentials<'a> {
    #[validate(length(min = 1, max = USER_ID_MAX_LEN, message = "userId length is out of range"))]
    pub user_id: &'a str,

    #[validate(length(min = 1, message = "password is required"))]
    pub secret: &'a str,
}

impl<'a> Credentials<'a> {
    pub fn parse(user_id: &'a str, secret: &'a str) -> Result<Self, DomainError> {
        let credentials = Self { user_id, secret };
        credentials
            .validate()
            .map_err(|e| DomainError::InvalidInput(e.to_string()))?;
        Ok(credentials)
    }
}

impl fmt::Debug for Credentials<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user_id", &self.user_id)
            .field("secret", &"<redacted>")
            .finish()
    }
}
