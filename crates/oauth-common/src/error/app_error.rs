//! Application error types
//!
//! Unified error type for callers that surface token failures to clients,
//! with the RFC 6749 section 5.2 error codes.

use serde::Serialize;
use std::fmt;

/// Application-wide error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Grant errors
    #[error("Invalid grant: {0}")]
    InvalidGrant(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Internal errors
    #[error("Internal server error")]
    Internal(#[source] anyhow::Error),
}

impl AppError {
    /// Get HTTP status code for this error
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request
            Self::InvalidGrant(_) => 400,

            // 500 Internal Server Error
            Self::Config(_) | Self::Internal(_) => 500,
        }
    }

    /// Get the OAuth2 `error` code for token endpoint responses
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidGrant(_) => "invalid_grant",
            Self::Config(_) | Self::Internal(_) => "server_error",
        }
    }

    /// Check if this is a client error (4xx)
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        let status = self.status_code();
        (400..500).contains(&status)
    }

    /// Check if this is a server error (5xx)
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        let status = self.status_code();
        (500..600).contains(&status)
    }

    /// Create an invalid grant error
    #[must_use]
    pub fn invalid_grant(reason: impl fmt::Display) -> Self {
        Self::InvalidGrant(reason.to_string())
    }

    /// Create an internal error from any error
    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }
}

/// Token endpoint error body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
}

impl From<&AppError> for ErrorResponse {
    fn from(err: &AppError) -> Self {
        // Server-side failure details stay in the logs
        let error_description = if err.is_server_error() {
            None
        } else {
            Some(err.to_string())
        };

        Self {
            error: err.error_code().to_string(),
            error_description,
        }
    }
}

impl From<AppError> for ErrorResponse {
    fn from(err: AppError) -> Self {
        Self::from(&err)
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::invalid_grant("expired").status_code(), 400);
        assert_eq!(AppError::Config("missing".to_string()).status_code(), 500);
        assert_eq!(AppError::internal(anyhow::anyhow!("down")).status_code(), 500);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(AppError::invalid_grant("x").error_code(), "invalid_grant");
        assert_eq!(AppError::Config("x".to_string()).error_code(), "server_error");
        assert_eq!(
            AppError::internal(anyhow::anyhow!("boom")).error_code(),
            "server_error"
        );
    }

    #[test]
    fn test_is_client_error() {
        assert!(AppError::invalid_grant("x").is_client_error());
        assert!(!AppError::internal(anyhow::anyhow!("test")).is_client_error());
        assert!(AppError::Config("test".to_string()).is_server_error());
    }

    #[test]
    fn test_error_response_for_grant() {
        let response = ErrorResponse::from(AppError::invalid_grant("Refresh token expired"));
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["error"], "invalid_grant");
        assert_eq!(
            json["error_description"],
            "Invalid grant: Refresh token expired"
        );
    }

    #[test]
    fn test_error_response_hides_server_details() {
        let response = ErrorResponse::from(AppError::internal(anyhow::anyhow!("password=hunter2")));
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["error"], "server_error");
        assert!(json.get("error_description").is_none());
    }
}
