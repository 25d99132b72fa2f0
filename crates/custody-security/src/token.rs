//! Opaque session tokens

use custody_shared::constants::SESSION_TOKEN_BYTES;
use rand::Rng;
use sha2::{Digest, Sha256};

/// 32 random bytes from the thread-local CSPRNG, hex encoded.
pub fn generate_session_token() -> String {
    let mut bytes = [0u8; SESSION_TOKEN_BYTES];
    rand::rng().fill(&mut bytes);
    hex::encode(bytes)
}

/// Shape check only: lowercase hex of the expected length.
pub fn is_well_formed(token: &str) -> bool {
    token.len() == SESSION_TOKEN_BYTES * 2
        && token.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// Key under which a session is stored. The token itself is never persisted.
pub fn token_digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}
