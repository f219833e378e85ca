//! Domain error types
//!
//! These errors are framework-agnostic and represent business-level failures.

use std::fmt;

use super::validation::FieldErrors;

#[derive(Debug)]
pub enum DomainError {
    /// Resource not found, with a user-facing message
    NotFound(String),
    /// Request rejected before touching the store
    Validation(String),
    /// Schema validation failed on one or more fields
    InvalidInput(FieldErrors),
    /// No session, or credentials did not match
    Unauthorized(String),
    /// Session present but not allowed to act on the resource
    Forbidden(String),
    /// Uniqueness violation (e.g. email already registered)
    Conflict(String),
    /// Database/persistence error
    Database(String),
    /// Generic internal error
    Internal(String),
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainError::NotFound(msg) => write!(f, "{}", msg),
            DomainError::Validation(msg) => write!(f, "{}", msg),
            DomainError::InvalidInput(errors) => write!(f, "Invalid input: {}", errors),
            DomainError::Unauthorized(msg) => write!(f, "{}", msg),
            DomainError::Forbidden(msg) => write!(f, "{}", msg),
            DomainError::Conflict(msg) => write!(f, "{}", msg),
            DomainError::Database(msg) => write!(f, "Database error: {}", msg),
            DomainError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}

// Conversion from SeaORM errors (used in infrastructure layer)
impl From<sea_orm::DbErr> for DomainError {
    fn from(e: sea_orm::DbErr) -> Self {
        DomainError::Database(e.to_string())
    }
}

impl From<FieldErrors> for DomainError {
    fn from(errors: FieldErrors) -> Self {
        DomainError::InvalidInput(errors)
    }
}
