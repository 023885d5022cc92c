//! Ports - the collaborators the token lifecycle depends on

mod clock;
mod repositories;
mod token_generator;

pub use clock::{Clock, ManualClock, SystemClock};
pub use repositories::{RefreshTokenRepository, RepoResult, RotateOutcome};
pub use token_generator::{RandomTokenGenerator, TokenGenerator};
