//! Refresh token database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Row of `oauth_refresh_tokens` joined with its client and user
///
/// The `client_*` and `user_*` columns come from LEFT JOINs and are NULL when
/// the token has no user, or when the referenced row is missing.
#[derive(Debug, Clone, FromRow)]
pub struct RefreshTokenModel {
    pub id: Uuid,
    pub token: String,
    pub client_id: Option<i64>,
    pub user_id: Option<i64>,
    pub scope: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub client_key: Option<String>,
    pub client_redirect_uri: Option<String>,
    pub user_username: Option<String>,
}

impl RefreshTokenModel {
    /// Check if token is expired at `now`
    #[inline]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
