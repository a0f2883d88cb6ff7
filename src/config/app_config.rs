use std::collections::HashMap;

use serde::Deserialize;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub session: SessionConfig,
    pub pool: PoolConfig,
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

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Session cookie and session table settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub table_name: String,
    pub cookie_name: String,
    /// Session lifetime after the last request, in seconds
    pub inactivity_secs: i64,
    /// Period of the expired-session sweep, in seconds
    pub cleanup_interval_secs: u64,
    pub secure_cookie: bool,
}

/// Connection pool settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    pub max_connections: u32,
    /// How long a caller may wait for a free connection, in seconds
    pub acquire_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
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

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            table_name: "sessions".to_string(),
            cookie_name: "connect.sid".to_string(),
            inactivity_secs: 24 * 60 * 60,
            cleanup_interval_secs: 15 * 60,
            secure_cookie: false,
        }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            acquire_timeout_secs: 60 * 60,
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

/// MySQL connection settings, read from `DB_HOST`, `DB_USER`, `DB_PASSWORD`,
/// `DB_NAME` and `DB_PORT`
///
/// Every field is required; there are no built-in defaults.
#[derive(Clone, Deserialize)]
pub struct DatabaseConfig {
    pub host: String,
    pub user: String,
    pub password: String,
    pub name: String,
    pub port: u16,
}

impl DatabaseConfig {
    /// Load from the process environment
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::build(config::Environment::with_prefix("DB").try_parsing(true))
    }

    /// Load from an explicit variable map instead of the process environment
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, config::ConfigError> {
        Self::build(
            config::Environment::with_prefix("DB")
                .try_parsing(true)
                .source(Some(vars)),
        )
    }

    fn build(source: config::Environment) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(source)
            .build()?
            .try_deserialize()
    }
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("name", &self.name)
            .field("port", &self.port)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db_vars() -> HashMap<String, String> {
        [
            ("DB_HOST", "db.internal"),
            ("DB_USER", "app"),
            ("DB_PASSWORD", "hunter22"),
            ("DB_NAME", "accounts"),
            ("DB_PORT", "3306"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.pool.max_connections, 10);
        assert_eq!(config.session.table_name, "sessions");
        assert_eq!(config.session.cleanup_interval_secs, 900);
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_database_config_from_vars() {
        let config = DatabaseConfig::from_vars(db_vars()).unwrap();

        assert_eq!(config.host, "db.internal");
        assert_eq!(config.user, "app");
        assert_eq!(config.password, "hunter22");
        assert_eq!(config.name, "accounts");
        assert_eq!(config.port, 3306);
    }

    #[test]
    fn test_database_config_requires_every_field() {
        for missing in ["DB_HOST", "DB_USER", "DB_PASSWORD", "DB_NAME", "DB_PORT"] {
            let mut vars = db_vars();
            vars.remove(missing);

            assert!(
                DatabaseConfig::from_vars(vars).is_err(),
                "{} should be required",
                missing
            );
        }
    }

    #[test]
    fn test_database_config_debug_redacts_password() {
        let config = DatabaseConfig::from_vars(db_vars()).unwrap();
        let debug = format!("{:?}", config);

        assert!(!debug.contains("hunter22"));
        assert!(debug.contains("[REDACTED]"));
    }
}
