//! # oauth-db
//!
//! Token store implementations of the `RefreshTokenRepository` port.
//!
//! ## Overview
//!
//! - Connection pool management and schema migrations
//! - Database models with SQLx `FromRow` derives
//! - Entity ↔ Model mappers
//! - `PgRefreshTokenRepository` (PostgreSQL) and
//!   `MemoryRefreshTokenRepository` (process-local, for tests and embedding)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use oauth_common::AppConfig;
//! use oauth_db::pool::{create_pool, run_migrations, DatabaseConfig};
//! use oauth_db::repositories::PgRefreshTokenRepository;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let app = AppConfig::from_env()?;
//!     let pool = create_pool(&DatabaseConfig::from(&app.database)).await?;
//!     run_migrations(&pool).await?;
//!     let token_repo = PgRefreshTokenRepository::new(pool);
//!
//!     // Hand the repository to the token manager...
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use pool::{create_pool, run_migrations, DatabaseConfig, PgPool};
pub use repositories::{MemoryRefreshTokenRepository, PgRefreshTokenRepository};
