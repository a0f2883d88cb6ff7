//! User entity and related types

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Store-assigned user identifier - always a positive integer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct UserId(i64);

impl UserId {
    /// Create a new UserId, rejecting zero and negative values
    pub fn new(id: i64) -> Result<Self, DomainError> {
        if id <= 0 {
            return Err(DomainError::decode(format!(
                "User ID must be a positive integer, got {}",
                id
            )));
        }

        Ok(Self(id))
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for UserId {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for i64 {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validated payload for account creation
///
/// Only produced by [`validate_insert_user`](super::validate_insert_user).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertUser {
    username: String,
    password: String,
}

impl InsertUser {
    pub(super) fn new(username: String, password: String) -> Self {
        Self { username, password }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    /// Replace the password with a derived value (e.g. a hash) before storage
    pub fn with_password(self, password: impl Into<String>) -> Self {
        Self {
            password: password.into(),
            ..self
        }
    }
}

/// Persisted user account
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    id: UserId,
    username: String,
    /// Stored as given by the caller - never exposed in serialization
    #[serde(skip_serializing)]
    password: String,
}

impl User {
    /// Build a user from a store-assigned id and the inserted payload
    pub fn from_insert(id: UserId, insert: InsertUser) -> Self {
        Self {
            id,
            username: insert.username,
            password: insert.password,
        }
    }

    /// Rebuild a user from stored columns
    pub fn restore(
        id: UserId,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let username = username.into();

        if username.is_empty() {
            return Err(DomainError::decode(format!(
                "User {} has an empty username",
                id
            )));
        }

        Ok(Self {
            id,
            username,
            password: password.into(),
        })
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_positive() {
        let id = UserId::new(42).unwrap();
        assert_eq!(id.value(), 42);
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn test_user_id_rejects_non_positive() {
        assert!(matches!(UserId::new(0), Err(DomainError::Decode { .. })));
        assert!(matches!(UserId::new(-7), Err(DomainError::Decode { .. })));
    }

    #[test]
    fn test_restore_rejects_empty_username() {
        let id = UserId::new(1).unwrap();
        let result = User::restore(id, "", "secret1");

        assert!(matches!(result, Err(DomainError::Decode { .. })));
    }

    #[test]
    fn test_from_insert_keeps_payload() {
        let insert = InsertUser::new("alice".to_string(), "secret1".to_string());
        let user = User::from_insert(UserId::new(3).unwrap(), insert);

        assert_eq!(user.id().value(), 3);
        assert_eq!(user.username(), "alice");
        assert_eq!(user.password(), "secret1");
    }

    #[test]
    fn test_with_password_replaces_only_password() {
        let insert = InsertUser::new("alice".to_string(), "secret1".to_string());
        let hashed = insert.with_password("$argon2id$...");

        assert_eq!(hashed.username(), "alice");
        assert_eq!(hashed.password(), "$argon2id$...");
    }

    #[test]
    fn test_user_serialization_excludes_password() {
        let user = User::restore(UserId::new(1).unwrap(), "alice", "secret1").unwrap();

        let json = serde_json::to_string(&user).unwrap();
        assert_eq!(json, r#"{"id":1,"username":"alice"}"#);
    }
}
