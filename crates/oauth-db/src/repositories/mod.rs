//! Repository implementations
//!
//! Implementations of the `RefreshTokenRepository` port defined in oauth-core.

mod error;
mod memory;
mod refresh_token;

pub use memory::MemoryRefreshTokenRepository;
pub use refresh_token::PgRefreshTokenRepository;
