//! Expired refresh token reaper
//!
//! Run with:
//! ```bash
//! cargo run -p oauth-reaper
//! ```
//!
//! Configuration is read from environment variables, or from the file named
//! by `OAUTH_CONFIG` with `OAUTH__SECTION__KEY` overrides.

use std::sync::Arc;

use anyhow::Context;
use oauth_common::{try_init_tracing_with_config, AppConfig, TracingConfig};
use oauth_core::traits::{RandomTokenGenerator, SystemClock};
use oauth_db::{create_pool, run_migrations, PgRefreshTokenRepository};
use oauth_service::{spawn_reaper, ServiceContextBuilder};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config()?;

    let tracing_config = if config.app.env.is_production() {
        TracingConfig::production()
    } else {
        TracingConfig::development()
    };
    if let Err(e) = try_init_tracing_with_config(tracing_config) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    if let Err(e) = run(config).await {
        error!(error = %e, "Reaper failed");
        return Err(e);
    }
    Ok(())
}

fn load_config() -> anyhow::Result<AppConfig> {
    match std::env::var("OAUTH_CONFIG") {
        Ok(path) => AppConfig::load(&path)
            .with_context(|| format!("Failed to load configuration from {path}")),
        Err(_) => AppConfig::from_env().context("Failed to load configuration"),
    }
}

async fn run(config: AppConfig) -> anyhow::Result<()> {
    info!(
        app = %config.app.name,
        env = ?config.app.env,
        rotation = ?config.oauth.rotation,
        "Configuration loaded"
    );

    info!("Connecting to PostgreSQL...");
    let pool = create_pool(&oauth_db::DatabaseConfig::from(&config.database))
        .await
        .context("Failed to connect to PostgreSQL")?;
    run_migrations(&pool)
        .await
        .context("Failed to run migrations")?;
    info!("PostgreSQL connection established");

    let period = config.oauth.reaper_period();
    let ctx = ServiceContextBuilder::new()
        .refresh_token_repo(Arc::new(PgRefreshTokenRepository::new(pool.clone())))
        .clock(Arc::new(SystemClock))
        .token_generator(Arc::new(RandomTokenGenerator::default()))
        .oauth(config.oauth)
        .build()
        .context("Failed to build service context")?;

    let reaper = spawn_reaper(ctx, period);

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    info!("Shutdown signal received");

    reaper.shutdown().await;
    pool.close().await;

    Ok(())
}
