//! Repository traits (ports)

pub mod account_repository;
pub mod session_repository;
pub mod user_repository;

pub use account_repository::AccountRepository;
pub use session_repository::SessionRepository;
pub use user_repository::UserRepository;

#[cfg(test)]
pub use account_repository::MockAccountRepository;
#[cfg(test)]
pub use session_repository::MockSessionRepository;
#[cfg(test)]
pub use user_repository::MockUserRepository;
