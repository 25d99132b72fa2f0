//! # Custody Security
//!
//! Security utilities: password hashing, opaque session tokens, signed tokens.

pub mod jwt;
pub mod password;
pub mod token;

pub use jwt::{Claims, JwtError, JwtService};
pub use password::{PasswordError, PasswordService};
