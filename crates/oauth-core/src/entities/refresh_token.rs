//! Refresh token entity
//!
//! A refresh token is immutable once issued. Rotation deletes the old row and
//! inserts a new one; nothing ever moves `expires_at`.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use super::{Client, User};
use crate::value_objects::Snowflake;

/// Who a refresh token was issued to
///
/// Storage keeps `client_id` and `user_id` as nullable columns. A token issued
/// through the client credentials grant has no user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenOwner {
    /// Client-only token
    Client { client_id: Snowflake },
    /// Token scoped to a resource owner of the client
    ClientUser {
        client_id: Snowflake,
        user_id: Snowflake,
    },
}

impl TokenOwner {
    /// Build the owner for a client and an optional user
    pub fn new(client_id: Snowflake, user_id: Option<Snowflake>) -> Self {
        match user_id {
            Some(user_id) => Self::ClientUser { client_id, user_id },
            None => Self::Client { client_id },
        }
    }

    /// Owner for the given entities
    pub fn of(client: &Client, user: Option<&User>) -> Self {
        Self::new(client.id, user.map(|u| u.id))
    }

    #[inline]
    pub fn client_id(&self) -> Snowflake {
        match self {
            Self::Client { client_id } | Self::ClientUser { client_id, .. } => *client_id,
        }
    }

    #[inline]
    pub fn user_id(&self) -> Option<Snowflake> {
        match self {
            Self::Client { .. } => None,
            Self::ClientUser { user_id, .. } => Some(*user_id),
        }
    }
}

/// Refresh token entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshToken {
    pub id: Uuid,
    pub token: String,
    pub owner: TokenOwner,
    /// Eagerly attached client, when the store loaded it
    pub client: Option<Client>,
    /// Eagerly attached user, when the store loaded it
    pub user: Option<User>,
    pub scope: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl RefreshToken {
    /// Issue a new token for `client`/`user` that expires `lifetime` after `now`
    pub fn issue(
        token: String,
        client: &Client,
        user: Option<&User>,
        scope: impl Into<String>,
        now: DateTime<Utc>,
        lifetime: Duration,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            token,
            owner: TokenOwner::of(client, user),
            client: Some(client.clone()),
            user: user.cloned(),
            scope: scope.into(),
            expires_at: now + lifetime,
            created_at: now,
        }
    }

    #[inline]
    pub fn client_id(&self) -> Snowflake {
        self.owner.client_id()
    }

    #[inline]
    pub fn user_id(&self) -> Option<Snowflake> {
        self.owner.user_id()
    }

    /// A token is expired once `now` reaches `expires_at`
    #[inline]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    fn issue(user: Option<&User>) -> RefreshToken {
        let client = Client::new(Snowflake::new(1), "test_client_1");
        RefreshToken::issue(
            "abc".to_string(),
            &client,
            user,
            "read_write",
            t0(),
            Duration::hours(1),
        )
    }

    #[test]
    fn test_issue_sets_expiry() {
        let token = issue(None);
        assert_eq!(token.created_at, t0());
        assert_eq!(token.expires_at, t0() + Duration::hours(1));
        assert_eq!(token.scope, "read_write");
        assert_eq!(token.client.as_ref().map(|c| c.id), Some(Snowflake::new(1)));
    }

    #[test]
    fn test_owner_without_user() {
        let token = issue(None);
        assert_eq!(
            token.owner,
            TokenOwner::Client {
                client_id: Snowflake::new(1)
            }
        );
        assert_eq!(token.user_id(), None);
        assert!(token.user.is_none());
    }

    #[test]
    fn test_owner_with_user() {
        let user = User::new(Snowflake::new(7), "test@user");
        let token = issue(Some(&user));
        assert_eq!(token.client_id(), Snowflake::new(1));
        assert_eq!(token.user_id(), Some(Snowflake::new(7)));
    }

    #[test]
    fn test_expiry_boundary() {
        let token = issue(None);
        let expires_at = token.expires_at;

        assert!(!token.is_expired_at(expires_at - Duration::seconds(1)));
        assert!(token.is_expired_at(expires_at));
        assert!(token.is_expired_at(expires_at + Duration::seconds(1)));
    }
}
