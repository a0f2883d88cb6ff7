//! MySQL user repository implementation

use async_trait::async_trait;
use sqlx::error::DatabaseError;
use sqlx::mysql::MySqlDatabaseError;
use sqlx::MySqlPool;
use tracing::{debug, error, info};

use crate::domain::user::{
    check_stored_lengths, field_too_long, InsertUser, User, UserId, UserRepository,
};
use crate::domain::DomainError;

pub const CREATE_USERS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        id INT AUTO_INCREMENT PRIMARY KEY,
        username VARCHAR(255) NOT NULL UNIQUE,
        password VARCHAR(255) NOT NULL
    )
"#;

/// Raw `users` row as returned by the driver
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i32,
    username: String,
    password: String,
}

impl TryFrom<UserRow> for User {
    type Error = DomainError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let id = UserId::new(i64::from(row.id))?;
        User::restore(id, row.username, row.password)
    }
}

/// MySQL implementation of UserRepository
///
/// All queries are parameterized and go through the shared pool.
#[derive(Debug, Clone)]
pub struct MySqlUserRepository {
    pool: MySqlPool,
}

impl MySqlUserRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for MySqlUserRepository {
    async fn get(&self, id: UserId) -> Result<Option<User>, DomainError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, password FROM users WHERE id = ?",
        )
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, user_id = %id, "Failed to get user");
            map_sqlx_error(&e, "Failed to get user")
        })?;

        row.map(User::try_from).transpose()
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, password FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, username = %username, "Failed to get user by username");
            map_sqlx_error(&e, "Failed to get user by username")
        })?;

        row.map(User::try_from).transpose()
    }

    async fn create(&self, user: InsertUser) -> Result<User, DomainError> {
        // Non-strict servers would truncate instead of failing
        check_stored_lengths(&user)?;

        let result = sqlx::query("INSERT INTO users (username, password) VALUES (?, ?)")
            .bind(user.username())
            .bind(user.password())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    debug!(username = %user.username(), "Username already taken");
                    return DomainError::duplicate_username(user.username());
                }

                if let Some(column) = too_long_column(&e) {
                    debug!(column = %column, "Value wider than its column");
                    return field_too_long(&column).into();
                }

                error!(error = %e, username = %user.username(), "Failed to create user");
                map_sqlx_error(&e, "Failed to create user")
            })?;

        let id = i64::try_from(result.last_insert_id())
            .map_err(|_| DomainError::decode("Inserted user ID does not fit in i64"))
            .and_then(UserId::new)?;

        Ok(User::from_insert(id, user))
    }

    async fn ensure_schema(&self) -> Result<(), DomainError> {
        sqlx::query(CREATE_USERS_TABLE)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to create users table");
                map_sqlx_error(&e, "Failed to create users table")
            })?;

        info!("Users table ready");
        Ok(())
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .is_some_and(|db| db.is_unique_violation())
}

const ER_DATA_TOO_LONG: u16 = 1406;

/// Column named by an ER_DATA_TOO_LONG error
fn too_long_column(e: &sqlx::Error) -> Option<String> {
    let mysql = e
        .as_database_error()?
        .try_downcast_ref::<MySqlDatabaseError>()?;

    if mysql.number() != ER_DATA_TOO_LONG {
        return None;
    }

    column_in_message(mysql.message()).map(str::to_string)
}

/// `Data too long for column 'username' at row 1` -> `username`
fn column_in_message(message: &str) -> Option<&str> {
    message.split('\'').nth(1).filter(|column| !column.is_empty())
}

/// Shape mismatches become `Decode`; everything else means the store could
/// not serve the request.
fn map_sqlx_error(e: &sqlx::Error, context: &str) -> DomainError {
    match e {
        sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::TypeNotFound { .. } => DomainError::decode(format!("{}: {}", context, e)),
        _ => DomainError::storage_unavailable(format!("{}: {}", context, e)),
    }
}
