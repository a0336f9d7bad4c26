//! Domain error types
//!
//! These errors are framework-agnostic and represent business-level failures.
//! The HTTP mapping lives in `api::error`.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Resource not found, carries the resource label ("Customer", "Product"...)
    NotFound(String),
    /// Input rejected before touching the store
    Validation(String),
    /// Operation not allowed in the record's current state
    InvalidState(String),
    /// Uniqueness violation
    Conflict(String),
    /// Missing or invalid credentials
    Unauthorized(String),
    /// Authenticated but not allowed
    Forbidden(String),
    /// Database/persistence error
    Database(String),
    /// Generic internal error
    Internal(String),
}

impl DomainError {
    pub fn not_found(resource: &str) -> Self {
        DomainError::NotFound(resource.to_string())
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainError::NotFound(what) => write!(f, "{} not found", what),
            DomainError::Validation(msg) => write!(f, "Validation error: {}", msg),
            DomainError::InvalidState(msg) => write!(f, "{}", msg),
            DomainError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            DomainError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            DomainError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            DomainError::Database(msg) => write!(f, "Database error: {}", msg),
            DomainError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}

// Conversion from SeaORM errors (used in infrastructure layer)
impl From<sea_orm::DbErr> for DomainError {
    fn from(e: sea_orm::DbErr) -> Self {
        match e.sql_err() {
            Some(sea_orm::SqlErr::UniqueConstraintViolation(detail)) => {
                DomainError::Conflict(detail)
            }
            _ => DomainError::Database(e.to_string()),
        }
    }
}
