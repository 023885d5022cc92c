//! Refresh token manager
//!
//! Issues, reuses, validates and revokes refresh tokens. Tokens are never
//! modified in place: a missing or expired token is replaced by a new row.

use chrono::{DateTime, Utc};
use oauth_common::RotationMode;
use oauth_core::entities::{Client, RefreshToken, TokenOwner, User};
use oauth_core::traits::RotateOutcome;
use tracing::{debug, info, instrument, warn};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Refresh token lifecycle service
pub struct RefreshTokenManager<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> RefreshTokenManager<'a> {
    /// Create a new RefreshTokenManager
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Return the live token for `client`/`user`, issuing a new one when none
    /// exists or the current one has expired
    ///
    /// An expired token is deleted before its replacement is stored. In
    /// [`RotationMode::ReadThenWrite`] two concurrent callers for the same
    /// owner can both observe "no live token" and both insert one.
    /// [`RotationMode::Atomic`] hands the whole step to the store instead.
    ///
    /// # Errors
    /// `ServiceError::Persistence` when the store fails. Never `NotFound` or
    /// `Expired`.
    #[instrument(
        skip(self, client, user, scope),
        fields(client_id = %client.id, user_id = ?user.map(|u| u.id))
    )]
    pub async fn get_or_create(
        &self,
        client: &Client,
        user: Option<&User>,
        scope: &str,
    ) -> ServiceResult<RefreshToken> {
        match self.ctx.oauth().rotation {
            RotationMode::ReadThenWrite => self.read_then_write(client, user, scope).await,
            RotationMode::Atomic => self.rotate_atomically(client, user, scope).await,
        }
    }

    async fn read_then_write(
        &self,
        client: &Client,
        user: Option<&User>,
        scope: &str,
    ) -> ServiceResult<RefreshToken> {
        let repo = self.ctx.refresh_token_repo();
        let now = self.ctx.clock().now();

        let existing = repo
            .find_by_owner(TokenOwner::of(client, user))
            .await
            .map_err(ServiceError::persistence("look up"))?;

        if let Some(existing) = existing {
            if !existing.is_expired_at(now) {
                debug!(token_id = %existing.id, "Reusing live refresh token");
                return Ok(existing);
            }

            repo.delete(&existing)
                .await
                .map_err(ServiceError::persistence("delete"))?;
            info!(
                token_id = %existing.id,
                expired_at = %existing.expires_at,
                "Deleted expired refresh token"
            );
        }

        let token = self.issue(client, user, scope, now);
        repo.create(&token)
            .await
            .map_err(ServiceError::persistence("create"))?;

        info!(token_id = %token.id, expires_at = %token.expires_at, "Issued refresh token");
        Ok(token)
    }

    async fn rotate_atomically(
        &self,
        client: &Client,
        user: Option<&User>,
        scope: &str,
    ) -> ServiceResult<RefreshToken> {
        let now = self.ctx.clock().now();
        let candidate = self.issue(client, user, scope, now);

        let outcome = self
            .ctx
            .refresh_token_repo()
            .rotate(&candidate, now)
            .await
            .map_err(ServiceError::persistence("rotate"))?;

        match outcome {
            RotateOutcome::Reused(token) => {
                debug!(token_id = %token.id, "Reusing live refresh token");
                Ok(token)
            }
            RotateOutcome::Created { token, superseded } => {
                if let Some(expired) = superseded {
                    info!(
                        token_id = %expired.id,
                        expired_at = %expired.expires_at,
                        "Deleted expired refresh token"
                    );
                }
                info!(token_id = %token.id, expires_at = %token.expires_at, "Issued refresh token");
                Ok(token)
            }
        }
    }

    fn issue(
        &self,
        client: &Client,
        user: Option<&User>,
        scope: &str,
        now: DateTime<Utc>,
    ) -> RefreshToken {
        RefreshToken::issue(
            self.ctx.token_generator().generate(),
            client,
            user,
            scope,
            now,
            self.ctx.oauth().refresh_token_ttl(),
        )
    }

    /// Validate a presented refresh token for `client`
    ///
    /// Never mutates the store; an expired token stays until it is rotated
    /// or purged.
    ///
    /// # Errors
    /// `NotFound` when no token matches the value for this client, `Expired`
    /// once `expires_at` is reached, `Persistence` on store failure.
    #[instrument(skip(self, token, client), fields(client_id = %client.id))]
    pub async fn get_valid(&self, token: &str, client: &Client) -> ServiceResult<RefreshToken> {
        let found = self
            .ctx
            .refresh_token_repo()
            .find_by_token(token, client.id)
            .await
            .map_err(ServiceError::persistence("look up"))?
            .ok_or_else(|| {
                warn!("Refresh token not found");
                ServiceError::NotFound {
                    client_id: client.id,
                }
            })?;

        if found.is_expired_at(self.ctx.clock().now()) {
            warn!(token_id = %found.id, expired_at = %found.expires_at, "Refresh token expired");
            return Err(ServiceError::Expired {
                client_id: client.id,
                expired_at: found.expires_at,
            });
        }

        Ok(found)
    }

    /// Delete the token `token` issued to `client`, returning whether it existed
    #[instrument(skip(self, token, client), fields(client_id = %client.id))]
    pub async fn revoke(&self, token: &str, client: &Client) -> ServiceResult<bool> {
        let removed = self
            .ctx
            .refresh_token_repo()
            .delete_by_token(token, client.id)
            .await
            .map_err(ServiceError::persistence("revoke"))?;

        if removed {
            info!("Revoked refresh token");
        }
        Ok(removed)
    }

    /// Delete every token issued to `client`/`user`
    #[instrument(
        skip(self, client, user),
        fields(client_id = %client.id, user_id = ?user.map(|u| u.id))
    )]
    pub async fn revoke_all(&self, client: &Client, user: Option<&User>) -> ServiceResult<u64> {
        let removed = self
            .ctx
            .refresh_token_repo()
            .delete_by_owner(TokenOwner::of(client, user))
            .await
            .map_err(ServiceError::persistence("revoke"))?;

        info!(removed, "Revoked refresh tokens");
        Ok(removed)
    }

    /// Delete every token whose `expires_at` has been reached
    #[instrument(skip(self))]
    pub async fn purge_expired(&self) -> ServiceResult<u64> {
        let now = self.ctx.clock().now();
        let purged = self
            .ctx
            .refresh_token_repo()
            .delete_expired(now)
            .await
            .map_err(ServiceError::persistence("purge"))?;

        debug!(purged, "Purged expired refresh tokens");
        Ok(purged)
    }
}
