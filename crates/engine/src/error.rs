//! The module contains the errors the engine can raise.
//!
//! Every mutation entry point translates low-level failures into one of these
//! variants; the message carried inside is safe to surface to a user (except
//! [`Database`], whose cause is logged and replaced by callers).
//!
//!  [`Database`]: EngineError::Database
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{0}")]
    Validation(String),
    #[error("invalid format: {0}")]
    Format(String),
    #[error("\"{0}\" already exists!")]
    Duplicate(String),
    #[error("operation blocked: {0}")]
    Conflict(String),
    #[error("\"{0}\" not found!")]
    KeyNotFound(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::Format(a), Self::Format(b)) => a == b,
            (Self::Duplicate(a), Self::Duplicate(b)) => a == b,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
