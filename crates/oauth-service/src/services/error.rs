//! Service layer error types
//!
//! The refresh token manager fails with exactly one of these kinds.

use chrono::{DateTime, Utc};
use oauth_common::AppError;
use oauth_core::{DomainError, Snowflake};
use std::fmt;

/// Service layer error type
#[derive(Debug)]
pub enum ServiceError {
    /// No token matches the presented value for this client
    NotFound { client_id: Snowflake },

    /// The presented token exists but `expires_at` has been reached
    Expired {
        client_id: Snowflake,
        expired_at: DateTime<Utc>,
    },

    /// The token store failed while performing `operation`
    Persistence {
        operation: &'static str,
        source: DomainError,
    },

    /// The service was wired or configured incorrectly
    Validation(String),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // The token value is never echoed back
            Self::NotFound { client_id } => {
                write!(f, "Refresh token not found for client {client_id}")
            }
            Self::Expired {
                client_id,
                expired_at,
            } => write!(
                f,
                "Refresh token for client {client_id} expired at {}",
                expired_at.to_rfc3339()
            ),
            Self::Persistence { operation, source } => {
                write!(f, "Failed to {operation} refresh token: {source}")
            }
            Self::Validation(msg) => write!(f, "Validation error: {msg}"),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Persistence { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl ServiceError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Wrap a store failure, for use with `map_err`
    pub fn persistence(operation: &'static str) -> impl FnOnce(DomainError) -> Self {
        move |source| Self::Persistence { operation, source }
    }

    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::Persistence { .. })
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound { .. } | Self::Expired { .. } => 400,
            Self::Persistence { .. } | Self::Validation(_) => 500,
        }
    }

    /// OAuth2 `error` code for token endpoint responses
    pub fn oauth_error(&self) -> &'static str {
        match self {
            Self::NotFound { .. } | Self::Expired { .. } => "invalid_grant",
            Self::Persistence { .. } | Self::Validation(_) => "server_error",
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound { .. } | ServiceError::Expired { .. } => {
                AppError::invalid_grant(&err)
            }
            ServiceError::Persistence { operation, source } => AppError::internal(
                anyhow::Error::new(source).context(format!("refresh token {operation} failed")),
            ),
            ServiceError::Validation(msg) => AppError::Config(msg),
        }
    }
}

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
