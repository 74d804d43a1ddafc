//! Application configuration

mod app_config;

pub use app_config::{
    AdminSeedConfig, AppConfig, AuthConfig, DatabaseConfig, Environment, LogFormat,
    LoggingConfig, ServerConfig,
};
