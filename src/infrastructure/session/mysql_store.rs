//! MySQL-backed session store for `tower-sessions`
//!
//! Uses the `express-mysql-session` column layout: `session_id` primary key,
//! `expires` as unix seconds, and `data` holding the JSON-encoded record.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::MySqlPool;
use time::OffsetDateTime;
use tokio::sync::OnceCell;
use tokio::task::JoinHandle;
use tower_sessions::session::{Id, Record};
use tower_sessions::session_store::{self, ExpiredDeletion, SessionStore};
use tracing::{debug, error, info, warn};

use crate::domain::DomainError;

const MAX_TABLE_NAME_LENGTH: usize = 64;

/// Session store persisting records in a dedicated MySQL table
///
/// The table is created on first use; [`MySqlSessionStore::migrate`] creates
/// it eagerly.
#[derive(Debug, Clone)]
pub struct MySqlSessionStore {
    pool: MySqlPool,
    table_name: String,
    schema_ready: Arc<OnceCell<()>>,
}

impl MySqlSessionStore {
    /// Create a store on the given pool and table
    ///
    /// The table name is interpolated into SQL, so only ASCII letters, digits
    /// and underscores are accepted.
    pub fn new(pool: MySqlPool, table_name: impl Into<String>) -> Result<Self, DomainError> {
        let table_name = table_name.into();
        validate_table_name(&table_name)?;

        Ok(Self {
            pool,
            table_name,
            schema_ready: Arc::new(OnceCell::new()),
        })
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Create the session table if absent
    pub async fn migrate(&self) -> Result<(), sqlx::Error> {
        let query = format!(
            r#"
            CREATE TABLE IF NOT EXISTS `{}` (
                session_id VARCHAR(128) CHARACTER SET utf8mb4 COLLATE utf8mb4_bin NOT NULL,
                expires INT(11) UNSIGNED NOT NULL,
                data MEDIUMTEXT CHARACTER SET utf8mb4 COLLATE utf8mb4_bin,
                PRIMARY KEY (session_id)
            ) ENGINE=InnoDB
            "#,
            self.table_name
        );

        sqlx::query(&query).execute(&self.pool).await?;
        info!(table = %self.table_name, "Sessions table ready");

        Ok(())
    }

    /// Push the expiry of an existing session without rewriting its payload
    ///
    /// Returns `false` when no row matched.
    pub async fn touch(&self, id: &Id, expiry: OffsetDateTime) -> session_store::Result<bool> {
        self.ensure_table().await?;

        let query = format!(
            "UPDATE `{}` SET expires = ? WHERE session_id = ?",
            self.table_name
        );

        let result = sqlx::query(&query)
            .bind(expires_column(expiry))
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| backend_error("Failed to touch session", &e))?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete expired sessions every `period` until the task is aborted
    pub fn spawn_expiry_sweep(self, period: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);

            loop {
                interval.tick().await;

                if let Err(e) = self.delete_expired().await {
                    warn!(error = %e, "Expired session sweep failed");
                }
            }
        })
    }

    async fn ensure_table(&self) -> session_store::Result<()> {
        self.schema_ready
            .get_or_try_init(|| async {
                self.migrate()
                    .await
                    .map_err(|e| backend_error("Failed to create sessions table", &e))
            })
            .await?;

        Ok(())
    }

    async fn insert(&self, record: &Record, data: String) -> Result<(), sqlx::Error> {
        let query = format!(
            "INSERT INTO `{}` (session_id, expires, data) VALUES (?, ?, ?)",
            self.table_name
        );

        sqlx::query(&query)
            .bind(record.id.to_string())
            .bind(expires_column(record.expiry_date))
            .bind(data)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl SessionStore for MySqlSessionStore {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        self.ensure_table().await?;

        loop {
            // The encoded payload embeds the ID, so re-encode after regenerating
            let data = encode_record(record)?;

            match self.insert(record, data).await {
                Ok(()) => return Ok(()),
                Err(e) if is_unique_violation(&e) => {
                    debug!("Session ID collision, regenerating");
                    record.id = Id::default();
                }
                Err(e) => return Err(backend_error("Failed to create session", &e)),
            }
        }
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        self.ensure_table().await?;

        let query = format!(
            r#"
            INSERT INTO `{}` (session_id, expires, data) VALUES (?, ?, ?)
            ON DUPLICATE KEY UPDATE expires = VALUES(expires), data = VALUES(data)
            "#,
            self.table_name
        );

        sqlx::query(&query)
            .bind(record.id.to_string())
            .bind(expires_column(record.expiry_date))
            .bind(encode_record(record)?)
            .execute(&self.pool)
            .await
            .map_err(|e| backend_error("Failed to save session", &e))?;

        Ok(())
    }

    async fn load(&self, id: &Id) -> session_store::Result<Option<Record>> {
        self.ensure_table().await?;

        let query = format!(
            "SELECT expires, data FROM `{}` WHERE session_id = ? AND expires > ?",
            self.table_name
        );

        // `_bin` collation flags the column BINARY, so it only decodes as bytes
        let row: Option<(u32, Option<Vec<u8>>)> = sqlx::query_as(&query)
            .bind(id.to_string())
            .bind(expires_column(OffsetDateTime::now_utc()))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| backend_error("Failed to load session", &e))?;

        row.map(|(expires, data)| decode_row(expires, data)).transpose()
    }

    async fn delete(&self, id: &Id) -> session_store::Result<()> {
        self.ensure_table().await?;

        let query = format!("DELETE FROM `{}` WHERE session_id = ?", self.table_name);

        sqlx::query(&query)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| backend_error("Failed to delete session", &e))?;

        Ok(())
    }
}

#[async_trait]
impl ExpiredDeletion for MySqlSessionStore {
    async fn delete_expired(&self) -> session_store::Result<()> {
        self.ensure_table().await?;

        let query = format!("DELETE FROM `{}` WHERE expires < ?", self.table_name);

        let result = sqlx::query(&query)
            .bind(expires_column(OffsetDateTime::now_utc()))
            .execute(&self.pool)
            .await
            .map_err(|e| backend_error("Failed to delete expired sessions", &e))?;

        debug!(deleted = result.rows_affected(), "Expired sessions removed");
        Ok(())
    }
}

fn validate_table_name(name: &str) -> Result<(), DomainError> {
    let valid = !name.is_empty()
        && name.len() <= MAX_TABLE_NAME_LENGTH
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');

    if valid {
        Ok(())
    } else {
        Err(DomainError::configuration(format!(
            "Invalid session table name '{}'",
            name
        )))
    }
}

/// `expires` is an unsigned 32-bit unix timestamp
fn expires_column(expiry: OffsetDateTime) -> u32 {
    u32::try_from(expiry.unix_timestamp().max(0)).unwrap_or(u32::MAX)
}

fn encode_record(record: &Record) -> session_store::Result<String> {
    serde_json::to_string(record).map_err(|e| session_store::Error::Encode(e.to_string()))
}

/// The `expires` column wins over the encoded expiry, since `touch` only
/// updates the column.
fn decode_row(expires: u32, data: Option<Vec<u8>>) -> session_store::Result<Record> {
    let data = data.ok_or_else(|| session_store::Error::Decode("Session has no data".to_string()))?;

    let mut record: Record = serde_json::from_slice(&data)
        .map_err(|e| session_store::Error::Decode(e.to_string()))?;

    record.expiry_date = OffsetDateTime::from_unix_timestamp(i64::from(expires))
        .map_err(|e| session_store::Error::Decode(e.to_string()))?;

    Ok(record)
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .is_some_and(|db| db.is_unique_violation())
}

fn backend_error(context: &str, e: &sqlx::Error) -> session_store::Error {
    error!(error = %e, "{}", context);
    session_store::Error::Backend(format!("{}: {}", context, e))
}
