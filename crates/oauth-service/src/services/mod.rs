//! Business logic services
//!
//! Services borrow a [`ServiceContext`] and orchestrate the domain ports it
//! holds.

pub mod context;
pub mod error;
pub mod reaper;
pub mod refresh_token;

pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
pub use reaper::{spawn_reaper, ReaperHandle};
pub use refresh_token::RefreshTokenManager;
