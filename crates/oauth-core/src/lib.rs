//! # oauth-core
//!
//! Domain layer containing the refresh token entities, value objects, ports
//! (repository, clock, token generator) and domain errors.
//! This crate has zero dependencies on infrastructure (database, runtime, etc.).

pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{Client, RefreshToken, TokenOwner, User};
pub use error::DomainError;
pub use traits::{
    Clock, ManualClock, RandomTokenGenerator, RefreshTokenRepository, RepoResult, RotateOutcome,
    SystemClock, TokenGenerator,
};
pub use value_objects::Snowflake;
