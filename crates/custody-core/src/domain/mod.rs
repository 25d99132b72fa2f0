//! # Custody Core - Domain Module
//!
//! Accounts, users, and sessions.

pub mod account;
pub mod session;
pub mod user;

pub use account::{Account, BalanceChange};
pub use session::{IssuedToken, Session};
pub use user::{Credentials, User};

/// Login identifier of a user.
pub type UserId = String;

/// Opaque account identifier.
pub type AccountId = String;
