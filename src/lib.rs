//! Authgate
//!
//! Username/password accounts persisted in MySQL, with cookie sessions
//! stored in the same database:
//! - Account store behind the `UserRepository` contract
//! - Field validation for account creation
//! - `tower-sessions` store on a MySQL table
//! - Register / login / logout / current-user HTTP endpoints

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{AppConfig, DatabaseConfig};

use std::sync::Arc;

use api::state::AppState;
use infrastructure::storage::MySqlStorage;
use infrastructure::user::Argon2Hasher;

/// Open the storage bundle and wire the application state around it
///
/// Users-table creation starts in the background; handlers wait on the
/// readiness gate before their first query. Must be called from within a
/// Tokio runtime.
pub fn create_app_state(
    config: &AppConfig,
    database: &DatabaseConfig,
) -> anyhow::Result<(AppState, MySqlStorage)> {
    let storage = MySqlStorage::open(database, &config.pool, &config.session.table_name)?;
    let readiness = storage.start_schema_init();

    let state = AppState::new(storage.users(), Arc::new(Argon2Hasher::new()), readiness);

    Ok((state, storage))
}
