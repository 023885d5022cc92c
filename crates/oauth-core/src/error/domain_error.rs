//! Domain errors - error types for the domain layer
//!
//! These are the failures a token store port can report. "Not found" is never
//! an error at this layer: lookups return `Ok(None)`.

use thiserror::Error;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Refresh token value already exists")]
    RefreshTokenConflict,

    // =========================================================================
    // Data Integrity Errors
    // =========================================================================
    #[error("Corrupt refresh token record: {0}")]
    CorruptRecord(String),

    // =========================================================================
    // Infrastructure Errors
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get the error code for logs and API responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::RefreshTokenConflict => "REFRESH_TOKEN_CONFLICT",
            Self::CorruptRecord(_) => "CORRUPT_RECORD",
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::RefreshTokenConflict)
    }
}
