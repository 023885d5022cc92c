//! Process-local implementation of RefreshTokenRepository
//!
//! Rows live in a single mutex-guarded vector, so `rotate` is atomic with
//! respect to every other call on the same store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::{debug, instrument};

use oauth_core::entities::{RefreshToken, TokenOwner};
use oauth_core::error::DomainError;
use oauth_core::traits::{RefreshTokenRepository, RepoResult, RotateOutcome};
use oauth_core::value_objects::Snowflake;

/// In-memory token store
#[derive(Debug, Default)]
pub struct MemoryRefreshTokenRepository {
    rows: Mutex<Vec<RefreshToken>>,
}

impl MemoryRefreshTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored tokens, expired ones included
    pub fn len(&self) -> usize {
        self.rows.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.lock().is_empty()
    }

    /// Copy of every stored token in insertion order
    pub fn snapshot(&self) -> Vec<RefreshToken> {
        self.rows.lock().clone()
    }

    /// Tokens issued to `owner`
    pub fn tokens_for(&self, owner: TokenOwner) -> Vec<RefreshToken> {
        self.rows
            .lock()
            .iter()
            .filter(|row| row.owner == owner)
            .cloned()
            .collect()
    }
}

/// Most recently created row for `owner`; later insertion wins a tie
fn latest_for(rows: &[RefreshToken], owner: TokenOwner) -> Option<&RefreshToken> {
    rows.iter()
        .enumerate()
        .filter(|(_, row)| row.owner == owner)
        .max_by_key(|(position, row)| (row.created_at, *position))
        .map(|(_, row)| row)
}

fn push_unique(rows: &mut Vec<RefreshToken>, token: &RefreshToken) -> RepoResult<()> {
    if rows.iter().any(|row| row.token == token.token || row.id == token.id) {
        return Err(DomainError::RefreshTokenConflict);
    }
    rows.push(token.clone());
    Ok(())
}

#[async_trait]
impl RefreshTokenRepository for MemoryRefreshTokenRepository {
    async fn find_by_owner(&self, owner: TokenOwner) -> RepoResult<Option<RefreshToken>> {
        let rows = self.rows.lock();
        Ok(latest_for(&rows, owner).cloned())
    }

    async fn find_by_token(
        &self,
        token: &str,
        client_id: Snowflake,
    ) -> RepoResult<Option<RefreshToken>> {
        let rows = self.rows.lock();
        Ok(rows
            .iter()
            .find(|row| row.token == token && row.client_id() == client_id)
            .cloned())
    }

    #[instrument(skip(self, token), fields(token_id = %token.id))]
    async fn create(&self, token: &RefreshToken) -> RepoResult<()> {
        push_unique(&mut self.rows.lock(), token)?;
        debug!("Stored refresh token");
        Ok(())
    }

    async fn delete(&self, token: &RefreshToken) -> RepoResult<bool> {
        let mut rows = self.rows.lock();
        let before = rows.len();
        rows.retain(|row| row.id != token.id);
        Ok(rows.len() < before)
    }

    async fn delete_by_token(&self, token: &str, client_id: Snowflake) -> RepoResult<bool> {
        let mut rows = self.rows.lock();
        let before = rows.len();
        rows.retain(|row| !(row.token == token && row.client_id() == client_id));
        Ok(rows.len() < before)
    }

    async fn delete_by_owner(&self, owner: TokenOwner) -> RepoResult<u64> {
        let mut rows = self.rows.lock();
        let before = rows.len();
        rows.retain(|row| row.owner != owner);
        Ok((before - rows.len()) as u64)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> RepoResult<u64> {
        let mut rows = self.rows.lock();
        let before = rows.len();
        rows.retain(|row| !row.is_expired_at(now));
        Ok((before - rows.len()) as u64)
    }

    #[instrument(skip(self, candidate), fields(owner = ?candidate.owner))]
    async fn rotate(
        &self,
        candidate: &RefreshToken,
        now: DateTime<Utc>,
    ) -> RepoResult<RotateOutcome> {
        let mut rows = self.rows.lock();

        let superseded = match latest_for(&rows, candidate.owner) {
            Some(current) if !current.is_expired_at(now) => {
                return Ok(RotateOutcome::Reused(current.clone()));
            }
            Some(expired) => Some(expired.clone()),
            None => None,
        };

        if let Some(expired) = &superseded {
            rows.retain(|row| row.id != expired.id);
        }
        push_unique(&mut rows, candidate)?;

        Ok(RotateOutcome::Created {
            token: candidate.clone(),
            superseded,
        })
    }
}
