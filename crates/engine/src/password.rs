//! Password verification tokens.
//!
//! Tokens are Argon2id PHC strings salted with the bytes of a fresh v4 UUID.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

pub const MIN_PASSWORD_LEN: usize = 6;

pub(crate) fn validate_password(raw: &str) -> ResultEngine<()> {
    if raw.chars().count() < MIN_PASSWORD_LEN {
        return Err(EngineError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters long"
        )));
    }
    Ok(())
}

/// Hashes `raw` into a PHC string.
pub fn hash_password(raw: &str) -> ResultEngine<String> {
    let salt = SaltString::encode_b64(Uuid::new_v4().as_bytes())
        .map_err(|err| EngineError::PasswordHash(err.to_string()))?;
    Argon2::default()
        .hash_password(raw.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| EngineError::PasswordHash(err.to_string()))
}

/// Checks `raw` against a stored PHC string. A malformed hash never
/// verifies.
#[must_use]
pub fn verify_password(raw: &str, stored: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored) else {
        tracing::warn!("stored password hash is malformed");
        return false;
    };
    Argon2::default()
        .verify_password(raw.as_bytes(), &parsed)
        .is_ok()
}
