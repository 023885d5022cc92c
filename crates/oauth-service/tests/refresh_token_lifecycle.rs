//! End-to-end refresh token lifecycle against the in-memory store
//!
//! ```bash
//! cargo test -p oauth-service --test refresh_token_lifecycle
//! ```

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use parking_lot::Mutex;
use tokio::sync::Barrier;

use oauth_common::{OauthConfig, RotationMode};
use oauth_core::entities::{Client, RefreshToken, TokenOwner, User};
use oauth_core::traits::{
    ManualClock, RefreshTokenRepository, RepoResult, RotateOutcome, TokenGenerator,
};
use oauth_core::value_objects::Snowflake;
use oauth_db::MemoryRefreshTokenRepository;
use oauth_service::{RefreshTokenManager, ServiceContext, ServiceContextBuilder, ServiceError};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
}

fn client() -> Client {
    Client::new(Snowflake::new(1), "C1").with_redirect_uri("https://www.example.com")
}

fn user() -> User {
    User::new(Snowflake::new(2), "U1")
}

/// Yields the scripted values in order, then "token-N"
struct ScriptedGenerator {
    script: Mutex<VecDeque<&'static str>>,
    fallback: Mutex<u32>,
}

impl ScriptedGenerator {
    fn new(script: &[&'static str]) -> Self {
        Self {
            script: Mutex::new(script.iter().copied().collect()),
            fallback: Mutex::new(0),
        }
    }
}

impl TokenGenerator for ScriptedGenerator {
    fn generate(&self) -> String {
        if let Some(next) = self.script.lock().pop_front() {
            return next.to_string();
        }
        let mut n = self.fallback.lock();
        *n += 1;
        format!("token-{n}")
    }
}

/// Holds every `find_by_owner` caller until `parties` lookups have completed,
/// so concurrent callers all act on the same pre-state
struct LockstepRepository {
    inner: Arc<MemoryRefreshTokenRepository>,
    lookups: Barrier,
}

#[async_trait]
impl RefreshTokenRepository for LockstepRepository {
    async fn find_by_owner(&self, owner: TokenOwner) -> RepoResult<Option<RefreshToken>> {
        let found = self.inner.find_by_owner(owner).await;
        self.lookups.wait().await;
        found
    }

    async fn find_by_token(
        &self,
        token: &str,
        client_id: Snowflake,
    ) -> RepoResult<Option<RefreshToken>> {
        self.inner.find_by_token(token, client_id).await
    }

    async fn create(&self, token: &RefreshToken) -> RepoResult<()> {
        self.inner.create(token).await
    }

    async fn delete(&self, token: &RefreshToken) -> RepoResult<bool> {
        self.inner.delete(token).await
    }

    async fn delete_by_token(&self, token: &str, client_id: Snowflake) -> RepoResult<bool> {
        self.inner.delete_by_token(token, client_id).await
    }

    async fn delete_by_owner(&self, owner: TokenOwner) -> RepoResult<u64> {
        self.inner.delete_by_owner(owner).await
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> RepoResult<u64> {
        self.inner.delete_expired(now).await
    }

    async fn rotate(
        &self,
        candidate: &RefreshToken,
        now: DateTime<Utc>,
    ) -> RepoResult<RotateOutcome> {
        self.inner.rotate(candidate, now).await
    }
}

fn one_hour(rotation: RotationMode) -> OauthConfig {
    OauthConfig {
        refresh_token_lifetime: 3600,
        rotation,
        ..OauthConfig::default()
    }
}

fn build_context(
    repo: Arc<dyn RefreshTokenRepository>,
    clock: Arc<ManualClock>,
    generator: ScriptedGenerator,
    rotation: RotationMode,
) -> ServiceContext {
    ServiceContextBuilder::new()
        .refresh_token_repo(repo)
        .clock(clock)
        .token_generator(Arc::new(generator))
        .oauth(one_hour(rotation))
        .build()
        .unwrap()
}

async fn run_scenario(rotation: RotationMode) {
    let repo = Arc::new(MemoryRefreshTokenRepository::new());
    let clock = Arc::new(ManualClock::new(t0()));
    let ctx = build_context(
        repo.clone(),
        clock.clone(),
        ScriptedGenerator::new(&["abc", "xyz"]),
        rotation,
    );
    let manager = RefreshTokenManager::new(&ctx);
    let (client, user) = (client(), user());

    // T0: nothing stored yet
    let abc = manager
        .get_or_create(&client, Some(&user), "read_write")
        .await
        .unwrap();
    assert_eq!(abc.token, "abc");
    assert_eq!(abc.expires_at, t0() + Duration::hours(1));
    assert_eq!(abc.client.as_ref(), Some(&client));
    assert_eq!(abc.user.as_ref(), Some(&user));

    // T0+30m: reused, and it validates
    clock.set(t0() + Duration::minutes(30));
    let again = manager
        .get_or_create(&client, Some(&user), "read_write")
        .await
        .unwrap();
    assert_eq!(again, abc);
    assert_eq!(manager.get_valid("abc", &client).await.unwrap(), abc);

    // T0+2h: validation reports expiry without deleting
    clock.set(t0() + Duration::hours(2));
    let err = manager.get_valid("abc", &client).await.unwrap_err();
    assert!(
        matches!(err, ServiceError::Expired { expired_at, .. } if expired_at == t0() + Duration::hours(1))
    );
    assert_eq!(repo.len(), 1);

    // T0+2h: rotation replaces "abc" with "xyz"
    let xyz = manager
        .get_or_create(&client, Some(&user), "read_write")
        .await
        .unwrap();
    assert_eq!(xyz.token, "xyz");
    assert_eq!(xyz.expires_at, t0() + Duration::hours(3));
    assert_eq!(repo.snapshot(), vec![xyz.clone()]);

    let err = manager.get_valid("abc", &client).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { .. }));
    assert_eq!(manager.get_valid("xyz", &client).await.unwrap(), xyz);
}

#[tokio::test]
async fn test_scenario_read_then_write() {
    run_scenario(RotationMode::ReadThenWrite).await;
}

#[tokio::test]
async fn test_scenario_atomic() {
    run_scenario(RotationMode::Atomic).await;
}

#[tokio::test]
async fn test_repeated_get_or_create_is_idempotent() {
    let repo = Arc::new(MemoryRefreshTokenRepository::new());
    let clock = Arc::new(ManualClock::new(t0()));
    let ctx = build_context(
        repo.clone(),
        clock.clone(),
        ScriptedGenerator::new(&[]),
        RotationMode::ReadThenWrite,
    );
    let manager = RefreshTokenManager::new(&ctx);
    let client = client();

    let first = manager.get_or_create(&client, None, "read").await.unwrap();
    for minutes in [1, 10, 59] {
        clock.set(t0() + Duration::minutes(minutes));
        let next = manager.get_or_create(&client, None, "read").await.unwrap();
        assert_eq!(next, first);
    }
    assert_eq!(repo.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_read_then_write_race_issues_two_tokens() {
    let store = Arc::new(MemoryRefreshTokenRepository::new());
    let repo = Arc::new(LockstepRepository {
        inner: store.clone(),
        lookups: Barrier::new(2),
    });
    let clock = Arc::new(ManualClock::new(t0()));
    let ctx = build_context(
        repo,
        clock,
        ScriptedGenerator::new(&[]),
        RotationMode::ReadThenWrite,
    );

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let ctx = ctx.clone();
            tokio::spawn(async move {
                let (client, user) = (client(), user());
                RefreshTokenManager::new(&ctx)
                    .get_or_create(&client, Some(&user), "read")
                    .await
            })
        })
        .collect();

    let mut issued = Vec::new();
    for handle in handles {
        issued.push(handle.await.unwrap().unwrap().token);
    }

    // Both callers saw "no token" and both inserted
    assert_ne!(issued[0], issued[1]);
    let owner = TokenOwner::of(&client(), Some(&user()));
    assert_eq!(store.tokens_for(owner).len(), 2);

    // Later lookups settle on the most recently created row
    let latest = store.find_by_owner(owner).await.unwrap().unwrap();
    assert!(issued.contains(&latest.token));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_atomic_rotation_converges_on_one_token() {
    let store = Arc::new(MemoryRefreshTokenRepository::new());
    let clock = Arc::new(ManualClock::new(t0()));
    let ctx = build_context(
        store.clone(),
        clock,
        ScriptedGenerator::new(&[]),
        RotationMode::Atomic,
    );

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let ctx = ctx.clone();
            tokio::spawn(async move {
                let (client, user) = (client(), user());
                RefreshTokenManager::new(&ctx)
                    .get_or_create(&client, Some(&user), "read")
                    .await
            })
        })
        .collect();

    let mut issued = Vec::new();
    for handle in handles {
        issued.push(handle.await.unwrap().unwrap().token);
    }
    issued.dedup();

    assert_eq!(issued.len(), 1);
    assert_eq!(store.len(), 1);
}
