//! Init-db command - creates the tables synchronously and exits

use anyhow::Context;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::infrastructure::storage::MySqlStorage;

pub async fn run() -> anyhow::Result<()> {
    let config = super::bootstrap();
    let database = DatabaseConfig::from_env().context("Database configuration is incomplete")?;

    let storage = MySqlStorage::open(&database, &config.pool, &config.session.table_name)?;
    let result = storage.initialize().await;
    storage.close().await;

    result.context("Database initialization failed")?;
    info!("Database initialized");

    Ok(())
}
