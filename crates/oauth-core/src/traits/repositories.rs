//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{RefreshToken, TokenOwner};
use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

/// Result of an atomic get-or-rotate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RotateOutcome {
    /// A non-expired token already existed and was left untouched
    Reused(RefreshToken),
    /// The candidate was inserted, replacing `superseded` if one had expired
    Created {
        token: RefreshToken,
        superseded: Option<RefreshToken>,
    },
}

impl RotateOutcome {
    /// The token the caller should hand out
    pub fn into_token(self) -> RefreshToken {
        match self {
            Self::Reused(token) | Self::Created { token, .. } => token,
        }
    }

    pub fn is_reused(&self) -> bool {
        matches!(self, Self::Reused(_))
    }
}

// ============================================================================
// Refresh Token Repository
// ============================================================================

#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    /// Find a token issued to `owner`
    ///
    /// A `Client` owner only matches rows without a user. When several rows
    /// match, the most recently created one is returned.
    async fn find_by_owner(&self, owner: TokenOwner) -> RepoResult<Option<RefreshToken>>;

    /// Find a token by its value, restricted to one client
    async fn find_by_token(
        &self,
        token: &str,
        client_id: Snowflake,
    ) -> RepoResult<Option<RefreshToken>>;

    /// Persist a new token
    async fn create(&self, token: &RefreshToken) -> RepoResult<()>;

    /// Delete a token row, returning whether it still existed
    async fn delete(&self, token: &RefreshToken) -> RepoResult<bool>;

    /// Delete a token by value for one client, returning whether a row was removed
    async fn delete_by_token(&self, token: &str, client_id: Snowflake) -> RepoResult<bool>;

    /// Delete every token issued to `owner`
    async fn delete_by_owner(&self, owner: TokenOwner) -> RepoResult<u64>;

    /// Delete all tokens with `expires_at <= now`
    async fn delete_expired(&self, now: DateTime<Utc>) -> RepoResult<u64>;

    /// Atomically return the owner's live token, or replace an expired/missing
    /// one with `candidate`
    ///
    /// The lookup, delete and insert happen as one unit with respect to other
    /// `rotate` calls for the same owner.
    async fn rotate(&self, candidate: &RefreshToken, now: DateTime<Utc>)
        -> RepoResult<RotateOutcome>;
}
