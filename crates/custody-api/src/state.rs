use std::sync::Arc;

use custody_core::repositories::{AccountRepository, UserRepository};
use custody_core::services::TokenStrategy;
use custody_core::{Ledger, SessionAuthenticator};

pub type SharedLedger = Arc<Ledger<dyn AccountRepository>>;
pub type SharedAuthenticator = Arc<SessionAuthenticator<dyn UserRepository, dyn TokenStrategy>>;

#[derive(Clone)]
pub struct AppState {
    pub ledger: SharedLedger,
    pub auth: SharedAuthenticator,
}

impl AppState {
    pub fn new(ledger: SharedLedger, auth: SharedAuthenticator) -> Self {
        Self { ledger, auth }
    }
}
