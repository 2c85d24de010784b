use rand::RngCore;
use sha2::{Digest, Sha256};

/// Generate a fresh opaque bearer token: 32 bytes of OS entropy, digested to
/// a fixed-width 64-char hex string. The token carries no claims; identity
/// comes from the server-side lookup.
pub fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    format!("{:x}", Sha256::digest(bytes))
}

/// Digest used for at-rest storage. Only this digest is persisted, so a
/// leaked token table cannot be replayed.
pub fn token_digest(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}
