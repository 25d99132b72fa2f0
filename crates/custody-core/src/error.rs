//! Domain errors

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    // Ledger
    #[error("Amount must be greater than 0")]
    InvalidAmount,

    #[error("Account not found")]
    AccountNotFound,

    #[error("Insufficient balance")]
    InsufficientBalance,

    // Authenticator
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("User already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Unauthorized")]
    Unauthorized,

    // Collaborators
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Expected outcomes a client can act on, as opposed to service faults.
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            DomainError::StorageUnavailable(_) | DomainError::InternalError(_)
        )
    }
}
