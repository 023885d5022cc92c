//! RefreshToken entity <-> model mapper

use chrono::{DateTime, Utc};
use oauth_core::entities::{Client, RefreshToken, TokenOwner, User};
use oauth_core::error::DomainError;
use oauth_core::value_objects::Snowflake;
use uuid::Uuid;

use crate::models::RefreshTokenModel;

/// Convert a joined row to a RefreshToken entity
///
/// A row without `client_id` cannot be validated against any client and is
/// reported as corrupt.
impl TryFrom<RefreshTokenModel> for RefreshToken {
    type Error = DomainError;

    fn try_from(model: RefreshTokenModel) -> Result<Self, Self::Error> {
        let client_id = model.client_id.map(Snowflake::new).ok_or_else(|| {
            DomainError::CorruptRecord(format!("refresh token {} has no client_id", model.id))
        })?;
        let user_id = model.user_id.map(Snowflake::new);

        let client = model.client_key.map(|key| Client {
            id: client_id,
            key,
            redirect_uri: model.client_redirect_uri,
        });
        let user = user_id
            .zip(model.user_username)
            .map(|(id, username)| User { id, username });

        Ok(RefreshToken {
            id: model.id,
            token: model.token,
            owner: TokenOwner::new(client_id, user_id),
            client,
            user,
            scope: model.scope,
            expires_at: model.expires_at,
            created_at: model.created_at,
        })
    }
}

/// RefreshToken entity reference as values for database insertion
pub struct RefreshTokenInsert<'a> {
    pub id: Uuid,
    pub token: &'a str,
    pub client_id: i64,
    pub user_id: Option<i64>,
    pub scope: &'a str,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl<'a> RefreshTokenInsert<'a> {
    pub fn new(token: &'a RefreshToken) -> Self {
        Self {
            id: token.id,
            token: &token.token,
            client_id: token.client_id().into_inner(),
            user_id: token.user_id().map(Snowflake::into_inner),
            scope: &token.scope,
            expires_at: token.expires_at,
            created_at: token.created_at,
        }
    }
}
