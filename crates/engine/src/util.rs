//! Internal helpers for input validation and identifier generation.
//!
//! These utilities are **not** part of the public API, except for
//! [`normalize_email`] which callers use to compare emails the way the engine
//! does.

use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

pub const REFERRAL_CODE_PREFIX: &str = "RGR-";
const REFERRAL_CODE_LEN: usize = 6;
const BASE36: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Key used to compare emails: NFKC normalized, trimmed and lowercased.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().nfkc().collect::<String>().to_lowercase()
}

/// Validates a registration email and returns it trimmed.
pub(crate) fn validate_email(email: &str) -> ResultEngine<String> {
    let trimmed = email.trim();
    let invalid = || EngineError::Validation(format!("invalid email address: {trimmed:?}"));
    if trimmed.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = trimmed.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    Ok(trimmed.to_string())
}

/// Returns the trimmed referral code, or `None` when blank.
pub(crate) fn normalize_referral_code(code: Option<&str>) -> Option<String> {
    code.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// A fresh `RGR-XXXXXX` code. Uniqueness is checked by the caller.
pub(crate) fn generate_referral_code() -> String {
    let mut value = Uuid::new_v4().as_u128();
    let mut code = String::with_capacity(REFERRAL_CODE_PREFIX.len() + REFERRAL_CODE_LEN);
    code.push_str(REFERRAL_CODE_PREFIX);
    for _ in 0..REFERRAL_CODE_LEN {
        let digit = (value % 36) as usize;
        code.push(char::from(BASE36[digit]));
        value /= 36;
    }
    code
}
