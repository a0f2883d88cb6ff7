//! User repository trait

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use super::entity::{InsertUser, User, UserId};
use crate::domain::DomainError;

/// Account storage contract consumed by request handlers
///
/// Lookups return `Ok(None)` for a missing row; errors are reserved for
/// storage failures and constraint violations.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Get a user by their store-assigned ID
    async fn get(&self, id: UserId) -> Result<Option<User>, DomainError>;

    /// Get a user by their username (login and duplicate checks)
    async fn get_by_username(&self, username: &str) -> Result<Option<User>, DomainError>;

    /// Insert a new user and return it with its assigned ID
    ///
    /// Fails with `DuplicateUsername` when the username is taken.
    async fn create(&self, user: InsertUser) -> Result<User, DomainError>;

    /// Create the backing table if absent; safe to run repeatedly
    async fn ensure_schema(&self) -> Result<(), DomainError>;
}
