//! # oauth-service
//!
//! Application layer: the refresh token manager, its dependency context and
//! the background reaper for expired tokens.

pub mod services;

pub use services::{
    spawn_reaper, ReaperHandle, RefreshTokenManager, ServiceContext, ServiceContextBuilder,
    ServiceError, ServiceResult,
};
