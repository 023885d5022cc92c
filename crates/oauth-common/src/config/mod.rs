//! Configuration structs

mod app_config;

pub use app_config::{
    AppConfig, AppSettings, ConfigError, DatabaseConfig, Environment, OauthConfig, RotationMode,
    MAX_REFRESH_TOKEN_LIFETIME,
};
