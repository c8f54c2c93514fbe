use serde::Deserialize;

use crate::infrastructure::user::PasswordAlgorithm;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub storage: StorageConfig,
    pub security: SecurityConfig,
    pub tokens: TokensConfig,
    pub breach_check: BreachCheckConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub database_url: Option<String>,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// HMAC secret for bearer tokens; a random one is generated when unset
    pub jwt_secret: Option<String>,
    pub jwt_expiration_hours: u32,
    pub password_hasher: PasswordAlgorithm,
    pub bcrypt_cost: u32,
    /// Password for the bootstrap admin; a random one is generated when unset
    pub admin_password: Option<String>,
}

/// One-time token and code settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TokensConfig {
    pub expiration_minutes: i64,
    pub code_length: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BreachCheckConfig {
    pub base_url: String,
    pub connect_timeout_ms: u64,
    pub read_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Redirect target after a contact channel is verified
    pub host: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            database_url: None,
            max_connections: 10,
        }
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            jwt_expiration_hours: 24,
            password_hasher: PasswordAlgorithm::default(),
            bcrypt_cost: bcrypt::DEFAULT_COST,
            admin_password: None,
        }
    }
}

impl Default for TokensConfig {
    fn default() -> Self {
        Self {
            expiration_minutes: 10,
            code_length: 4,
        }
    }
}

impl Default for BreachCheckConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.pwnedpasswords.com".to_string(),
            connect_timeout_ms: 2_000,
            read_timeout_ms: 5_000,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost:3000".to_string(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.tokens.expiration_minutes, 10);
        assert_eq!(config.tokens.code_length, 4);
        assert_eq!(config.breach_check.base_url, "https://api.pwnedpasswords.com");
        assert_eq!(config.security.password_hasher, PasswordAlgorithm::Bcrypt);
    }

    #[test]
    fn test_partial_sources_fill_defaults() {
        let config: AppConfig = config::Config::builder()
            .set_override("storage.backend", "postgres")
            .unwrap()
            .set_override("ui.host", "https://ui.example.com")
            .unwrap()
            .set_override("security.password_hasher", "argon2")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.storage.backend, StorageBackend::Postgres);
        assert_eq!(config.storage.max_connections, 10);
        assert_eq!(config.ui.host, "https://ui.example.com");
        assert_eq!(config.security.password_hasher, PasswordAlgorithm::Argon2);
        assert_eq!(config.server.port, 8080);
    }
}
