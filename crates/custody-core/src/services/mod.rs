//! Domain services (business logic)

pub mod authenticator;
pub mod ledger;
pub mod sweeper;
pub mod token_strategy;

pub use authenticator::{Registration, SessionAuthenticator};
pub use ledger::Ledger;
pub use sweeper::spawn_session_sweeper;
pub use token_strategy::{SignedSessions, StoredSessions, TokenStrategy};
