//! Domain entities - core business objects

mod client;
mod refresh_token;
mod user;

pub use client::Client;
pub use refresh_token::{RefreshToken, TokenOwner};
pub use user::User;
