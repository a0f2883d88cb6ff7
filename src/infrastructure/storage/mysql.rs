//! MySQL storage bundle: one pool shared by accounts and sessions

use std::sync::Arc;
use std::time::Duration;

use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use tracing::info;

use super::readiness::{spawn_schema_init, Readiness};
use crate::config::{DatabaseConfig, PoolConfig};
use crate::domain::user::UserRepository;
use crate::domain::DomainError;
use crate::infrastructure::session::MySqlSessionStore;
use crate::infrastructure::user::MySqlUserRepository;

/// Account store and session store over a single fixed-size pool
///
/// Built once at startup and passed to whoever needs it.
#[derive(Debug, Clone)]
pub struct MySqlStorage {
    pool: MySqlPool,
    users: Arc<MySqlUserRepository>,
    sessions: MySqlSessionStore,
}

impl MySqlStorage {
    /// Build the pool and stores without touching the network
    ///
    /// Connections are opened lazily on first use.
    pub fn open(
        database: &DatabaseConfig,
        pool_config: &PoolConfig,
        session_table: &str,
    ) -> Result<Self, DomainError> {
        info!(
            host = %database.host,
            port = database.port,
            database = %database.name,
            max_connections = pool_config.max_connections,
            "Configuring MySQL pool"
        );

        let pool = pool_options(pool_config).connect_lazy_with(connect_options(database));
        let sessions = MySqlSessionStore::new(pool.clone(), session_table)?;

        Ok(Self {
            users: Arc::new(MySqlUserRepository::new(pool.clone())),
            sessions,
            pool,
        })
    }

    /// Kick off users-table creation in the background and return the gate
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start_schema_init(&self) -> Readiness {
        spawn_schema_init(self.users())
    }

    /// Create both tables, waiting for completion
    pub async fn initialize(&self) -> Result<(), DomainError> {
        self.users.ensure_schema().await?;

        self.sessions.migrate().await.map_err(|e| {
            DomainError::storage_unavailable(format!("Failed to create sessions table: {}", e))
        })
    }

    pub fn users(&self) -> Arc<dyn UserRepository> {
        self.users.clone()
    }

    pub fn session_store(&self) -> MySqlSessionStore {
        self.sessions.clone()
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    /// Close every pooled connection
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn connect_options(database: &DatabaseConfig) -> MySqlConnectOptions {
    MySqlConnectOptions::new()
        .host(&database.host)
        .port(database.port)
        .username(&database.user)
        .password(&database.password)
        .database(&database.name)
}

/// Fixed-size pool; callers queue for a free connection up to the acquire
/// timeout instead of being rejected
fn pool_options(config: &PoolConfig) -> MySqlPoolOptions {
    MySqlPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn database_config() -> DatabaseConfig {
        DatabaseConfig {
            host: "localhost".to_string(),
            user: "app".to_string(),
            password: "secret".to_string(),
            name: "accounts".to_string(),
            port: 3306,
        }
    }

    #[test]
    fn test_pool_options_use_configured_capacity() {
        let options = pool_options(&PoolConfig::default());

        assert_eq!(options.get_max_connections(), 10);
        assert_eq!(options.get_acquire_timeout(), Duration::from_secs(3600));
    }

    #[tokio::test]
    async fn test_open_is_lazy() {
        let storage =
            MySqlStorage::open(&database_config(), &PoolConfig::default(), "sessions").unwrap();

        assert_eq!(storage.pool().size(), 0);
        assert_eq!(storage.session_store().table_name(), "sessions");
    }

    #[tokio::test]
    async fn test_open_rejects_bad_session_table() {
        let result = MySqlStorage::open(&database_config(), &PoolConfig::default(), "bad name");

        assert!(matches!(result, Err(DomainError::Configuration { .. })));
    }
}
