//! # Custody Infrastructure
//!
//! Storage adapters for the repository ports: in-memory and PostgreSQL.

pub mod database;
pub mod memory;

pub use database::{create_pool, run_migrations, PgStore};
pub use memory::MemoryStore;
