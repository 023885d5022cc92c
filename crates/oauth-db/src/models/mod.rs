//! Database models - SQLx-compatible structs for PostgreSQL tables

mod refresh_token;

pub use refresh_token::RefreshTokenModel;
