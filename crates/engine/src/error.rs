//! The module contains the errors the engine can throw.
//!
//! Every error is recoverable at the call boundary: the caller renders it as
//! a message and the user retries the action.
//!
//! - [`Validation`] bad user input (email, password, amount, currency code).
//! - [`Auth`] bad credentials or an already registered email.
//! - [`InsufficientBalance`] a swap asks for more than the account holds.
//! - [`UnsupportedPair`] a swap between two currencies without a rate.
//! - [`NotLoggedIn`] an operation that needs a session was called without one.
//!
//!  [`Validation`]: EngineError::Validation
//!  [`Auth`]: EngineError::Auth
//!  [`InsufficientBalance`]: EngineError::InsufficientBalance
//!  [`UnsupportedPair`]: EngineError::UnsupportedPair
//!  [`NotLoggedIn`]: EngineError::NotLoggedIn
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Authentication failed: {0}")]
    Auth(String),
    #[error("Insufficient balance: {0}")]
    InsufficientBalance(String),
    #[error("Unsupported pair: {0}")]
    UnsupportedPair(String),
    #[error("User not logged in")]
    NotLoggedIn,
    #[error("Password hashing failed: {0}")]
    PasswordHash(String),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::Auth(a), Self::Auth(b)) => a == b,
            (Self::InsufficientBalance(a), Self::InsufficientBalance(b)) => a == b,
            (Self::UnsupportedPair(a), Self::UnsupportedPair(b)) => a == b,
            (Self::NotLoggedIn, Self::NotLoggedIn) => true,
            (Self::PasswordHash(a), Self::PasswordHash(b)) => a == b,
            (Self::Serialization(a), Self::Serialization(b)) => a.to_string() == b.to_string(),
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
