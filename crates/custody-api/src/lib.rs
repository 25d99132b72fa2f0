//! # Custody API
//!
//! HTTP handlers, bearer middleware, and the response envelope.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use router::{build_app, build_router};
pub use state::AppState;
