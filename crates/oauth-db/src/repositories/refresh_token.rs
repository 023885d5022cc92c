//! PostgreSQL implementation of RefreshTokenRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool};
use tracing::{debug, instrument};
use uuid::Uuid;

use oauth_core::entities::{RefreshToken, TokenOwner};
use oauth_core::error::DomainError;
use oauth_core::traits::{RefreshTokenRepository, RepoResult, RotateOutcome};
use oauth_core::value_objects::Snowflake;

use crate::mappers::RefreshTokenInsert;
use crate::models::RefreshTokenModel;

use super::error::{map_db_error, map_unique_violation};

/// Token columns plus the eagerly loaded client and user
macro_rules! select_token {
    ($filter:literal) => {
        concat!(
            r#"
            SELECT t.id, t.token, t.client_id, t.user_id, t.scope, t.expires_at, t.created_at,
                   c.key AS client_key, c.redirect_uri AS client_redirect_uri,
                   u.username AS user_username
            FROM oauth_refresh_tokens t
            LEFT JOIN oauth_clients c ON c.id = t.client_id
            LEFT JOIN oauth_users u ON u.id = t.user_id
            "#,
            $filter
        )
    };
}

/// PostgreSQL implementation of RefreshTokenRepository
#[derive(Clone)]
pub struct PgRefreshTokenRepository {
    pool: PgPool,
}

impl PgRefreshTokenRepository {
    /// Create a new PgRefreshTokenRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Query helpers shared by the pool-backed methods and the `rotate` transaction

async fn fetch_by_owner<'e, E>(
    executor: E,
    owner: TokenOwner,
) -> Result<Option<RefreshTokenModel>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, RefreshTokenModel>(select_token!(
        r#"
        WHERE t.client_id = $1 AND t.user_id IS NOT DISTINCT FROM $2
        ORDER BY t.created_at DESC, t.id DESC
        LIMIT 1
        "#
    ))
    .bind(owner.client_id().into_inner())
    .bind(owner.user_id().map(Snowflake::into_inner))
    .fetch_optional(executor)
    .await
}

async fn insert<'e, E>(executor: E, token: &RefreshToken) -> Result<(), sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let row = RefreshTokenInsert::new(token);

    sqlx::query(
        r#"
        INSERT INTO oauth_refresh_tokens (id, token, client_id, user_id, scope, expires_at, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(row.id)
    .bind(row.token)
    .bind(row.client_id)
    .bind(row.user_id)
    .bind(row.scope)
    .bind(row.expires_at)
    .bind(row.created_at)
    .execute(executor)
    .await?;

    Ok(())
}

async fn delete_by_id<'e, E>(executor: E, id: Uuid) -> Result<u64, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM oauth_refresh_tokens WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected())
}

/// Advisory lock key serialising `rotate` calls for one owner
fn lock_key(owner: TokenOwner) -> String {
    match owner.user_id() {
        Some(user_id) => format!("oauth_refresh_token:{}:{user_id}", owner.client_id()),
        None => format!("oauth_refresh_token:{}:-", owner.client_id()),
    }
}

fn map_insert_error(e: sqlx::Error) -> DomainError {
    map_unique_violation(e, || DomainError::RefreshTokenConflict)
}

#[async_trait]
impl RefreshTokenRepository for PgRefreshTokenRepository {
    #[instrument(skip(self))]
    async fn find_by_owner(&self, owner: TokenOwner) -> RepoResult<Option<RefreshToken>> {
        fetch_by_owner(&self.pool, owner)
            .await
            .map_err(map_db_error)?
            .map(RefreshToken::try_from)
            .transpose()
    }

    #[instrument(skip(self, token))]
    async fn find_by_token(
        &self,
        token: &str,
        client_id: Snowflake,
    ) -> RepoResult<Option<RefreshToken>> {
        sqlx::query_as::<_, RefreshTokenModel>(select_token!(
            r#"
            WHERE t.token = $1 AND t.client_id = $2
            "#
        ))
        .bind(token)
        .bind(client_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?
        .map(RefreshToken::try_from)
        .transpose()
    }

    #[instrument(skip(self, token), fields(client_id = %token.client_id(), token_id = %token.id))]
    async fn create(&self, token: &RefreshToken) -> RepoResult<()> {
        insert(&self.pool, token).await.map_err(map_insert_error)?;

        debug!("Stored refresh token");
        Ok(())
    }

    #[instrument(skip(self, token), fields(token_id = %token.id))]
    async fn delete(&self, token: &RefreshToken) -> RepoResult<bool> {
        let deleted = delete_by_id(&self.pool, token.id)
            .await
            .map_err(map_db_error)?;

        Ok(deleted > 0)
    }

    #[instrument(skip(self, token))]
    async fn delete_by_token(&self, token: &str, client_id: Snowflake) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM oauth_refresh_tokens
            WHERE token = $1 AND client_id = $2
            "#,
        )
        .bind(token)
        .bind(client_id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn delete_by_owner(&self, owner: TokenOwner) -> RepoResult<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM oauth_refresh_tokens
            WHERE client_id = $1 AND user_id IS NOT DISTINCT FROM $2
            "#,
        )
        .bind(owner.client_id().into_inner())
        .bind(owner.user_id().map(Snowflake::into_inner))
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn delete_expired(&self, now: DateTime<Utc>) -> RepoResult<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM oauth_refresh_tokens
            WHERE expires_at <= $1
            "#,
        )
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self, candidate), fields(owner = ?candidate.owner))]
    async fn rotate(
        &self,
        candidate: &RefreshToken,
        now: DateTime<Utc>,
    ) -> RepoResult<RotateOutcome> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(lock_key(candidate.owner))
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        let current = fetch_by_owner(&mut *tx, candidate.owner)
            .await
            .map_err(map_db_error)?;

        let superseded = match current {
            Some(model) if !model.is_expired_at(now) => {
                tx.commit().await.map_err(map_db_error)?;
                return RefreshToken::try_from(model).map(RotateOutcome::Reused);
            }
            Some(model) => {
                delete_by_id(&mut *tx, model.id)
                    .await
                    .map_err(map_db_error)?;
                Some(RefreshToken::try_from(model)?)
            }
            None => None,
        };

        insert(&mut *tx, candidate).await.map_err(map_insert_error)?;
        tx.commit().await.map_err(map_db_error)?;

        debug!(replaced = superseded.is_some(), "Rotated refresh token");

        Ok(RotateOutcome::Created {
            token: candidate.clone(),
            superseded,
        })
    }
}
