//! Application-wide constants

pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24;
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 366;
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 300;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;
pub const MAX_USER_ID_LENGTH: usize = 64;
pub const SESSION_TOKEN_BYTES: usize = 32;
pub const TOKEN_TYPE_SESSION: &str = "session";
