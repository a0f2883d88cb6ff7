//! In-memory user repository implementation

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::user::{check_stored_lengths, InsertUser, User, UserId, UserRepository};
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<UserId, User>,
    /// Index for username -> user ID lookup
    username_index: HashMap<String, UserId>,
    next_id: i64,
}

/// In-memory implementation of UserRepository
///
/// Mirrors the MySQL semantics: auto-increment IDs starting at 1 and a unique
/// username constraint. Useful as a swappable fake for handler tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserRepository {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryUserRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get(&self, id: UserId) -> Result<Option<User>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(&id).cloned())
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        let tables = self.tables.read().await;

        Ok(tables
            .username_index
            .get(username)
            .and_then(|id| tables.users.get(id))
            .cloned())
    }

    async fn create(&self, user: InsertUser) -> Result<User, DomainError> {
        check_stored_lengths(&user)?;

        let mut tables = self.tables.write().await;

        if tables.username_index.contains_key(user.username()) {
            return Err(DomainError::duplicate_username(user.username()));
        }

        tables.next_id += 1;
        let id = UserId::new(tables.next_id)?;
        let user = User::from_insert(id, user);

        tables.username_index.insert(user.username().to_string(), id);
        tables.users.insert(id, user.clone());

        Ok(user)
    }

    async fn ensure_schema(&self) -> Result<(), DomainError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::{validate_insert_user, UserCandidate};

    fn insert(username: &str, password: &str) -> InsertUser {
        validate_insert_user(UserCandidate::new(username, password)).unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get_by_username() {
        let repo = InMemoryUserRepository::new();

        let created = repo.create(insert("alice", "secret1")).await.unwrap();
        let found = repo.get_by_username("alice").await.unwrap().unwrap();

        assert_eq!(found, created);
        assert!(found.id().value() > 0);
        assert_eq!(found.password(), "secret1");
    }

    #[tokio::test]
    async fn test_ids_are_sequential() {
        let repo = InMemoryUserRepository::new();

        let first = repo.create(insert("alice", "secret1")).await.unwrap();
        let second = repo.create(insert("bob", "secret2")).await.unwrap();

        assert_eq!(first.id().value(), 1);
        assert_eq!(second.id().value(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_username_keeps_first_row() {
        let repo = InMemoryUserRepository::new();
        let first = repo.create(insert("alice", "secret1")).await.unwrap();

        let result = repo.create(insert("alice", "different")).await;

        assert!(matches!(
            result,
            Err(DomainError::DuplicateUsername { ref username }) if username == "alice"
        ));
        assert_eq!(repo.get(first.id()).await.unwrap(), Some(first));
    }

    #[tokio::test]
    async fn test_missing_lookups_return_none() {
        let repo = InMemoryUserRepository::new();

        assert!(repo.get(UserId::new(999_999).unwrap()).await.unwrap().is_none());
        assert!(repo.get_by_username("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_overlong_username_is_rejected() {
        let repo = InMemoryUserRepository::new();
        let result = repo.create(insert(&"u".repeat(256), "secret1")).await;

        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert_eq!(repo.create(insert("alice", "secret1")).await.unwrap().id().value(), 1);
    }

    #[tokio::test]
    async fn test_ensure_schema_is_idempotent() {
        let repo = InMemoryUserRepository::new();
        let user = repo.create(insert("alice", "secret1")).await.unwrap();

        repo.ensure_schema().await.unwrap();
        repo.ensure_schema().await.unwrap();

        assert_eq!(repo.get(user.id()).await.unwrap(), Some(user));
    }
}
