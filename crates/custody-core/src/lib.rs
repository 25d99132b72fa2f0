//! # Custody Core
//!
//! Domain entities, repository traits, the account ledger and the session
//! authenticator.

pub mod domain;
pub mod services;
pub mod repositories;
pub mod error;

// Re-export domain entities
pub use domain::*;
pub use error::DomainError;
pub use services::{Ledger, SessionAuthenticator};
