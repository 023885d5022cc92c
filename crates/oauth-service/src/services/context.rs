//! Service context - dependency container for services
//!
//! Holds the token store, clock, token generator and refresh token policy.

use std::sync::Arc;

use oauth_common::OauthConfig;
use oauth_core::traits::{Clock, RefreshTokenRepository, TokenGenerator};

/// Service context containing all dependencies
///
/// Cheap to clone; every port sits behind an `Arc`.
#[derive(Clone)]
pub struct ServiceContext {
    refresh_token_repo: Arc<dyn RefreshTokenRepository>,
    clock: Arc<dyn Clock>,
    token_generator: Arc<dyn TokenGenerator>,
    oauth: OauthConfig,
}

impl ServiceContext {
    /// Create a new service context with all dependencies
    pub fn new(
        refresh_token_repo: Arc<dyn RefreshTokenRepository>,
        clock: Arc<dyn Clock>,
        token_generator: Arc<dyn TokenGenerator>,
        oauth: OauthConfig,
    ) -> Self {
        Self {
            refresh_token_repo,
            clock,
            token_generator,
            oauth,
        }
    }

    /// Get the refresh token repository
    pub fn refresh_token_repo(&self) -> &dyn RefreshTokenRepository {
        self.refresh_token_repo.as_ref()
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn token_generator(&self) -> &dyn TokenGenerator {
        self.token_generator.as_ref()
    }

    /// Refresh token policy
    pub fn oauth(&self) -> &OauthConfig {
        &self.oauth
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("refresh_token_repo", &"...")
            .field("clock", &"...")
            .field("token_generator", &"...")
            .field("oauth", &self.oauth)
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
///
/// The repository, clock and generator are required. The policy falls back to
/// `OauthConfig::default()`.
#[derive(Default)]
pub struct ServiceContextBuilder {
    refresh_token_repo: Option<Arc<dyn RefreshTokenRepository>>,
    clock: Option<Arc<dyn Clock>>,
    token_generator: Option<Arc<dyn TokenGenerator>>,
    oauth: Option<OauthConfig>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn refresh_token_repo(mut self, repo: Arc<dyn RefreshTokenRepository>) -> Self {
        self.refresh_token_repo = Some(repo);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn token_generator(mut self, generator: Arc<dyn TokenGenerator>) -> Self {
        self.token_generator = Some(generator);
        self
    }

    pub fn oauth(mut self, oauth: OauthConfig) -> Self {
        self.oauth = Some(oauth);
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    /// or the policy is unusable
    pub fn build(self) -> super::error::ServiceResult<ServiceContext> {
        use super::error::ServiceError;

        let oauth = self.oauth.unwrap_or_default();
        oauth
            .validate()
            .map_err(|e| ServiceError::validation(e.to_string()))?;

        Ok(ServiceContext::new(
            self.refresh_token_repo
                .ok_or_else(|| ServiceError::validation("refresh_token_repo is required"))?,
            self.clock
                .ok_or_else(|| ServiceError::validation("clock is required"))?,
            self.token_generator
                .ok_or_else(|| ServiceError::validation("token_generator is required"))?,
            oauth,
        ))
    }
}
