//! Layered application configuration

mod app_config;

pub use app_config::{
    AppConfig, BreachCheckConfig, LogFormat, LoggingConfig, SecurityConfig, ServerConfig,
    StorageBackend, StorageConfig, TokensConfig, UiConfig,
};
