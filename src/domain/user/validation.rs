//! Input validation for account creation

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use super::entity::InsertUser;

pub const USERNAME_REQUIRED: &str = "Username is required";
pub const PASSWORD_TOO_SHORT: &str = "Password must be at least 6 characters";

/// Width of the `username` and `password` columns, in characters
pub const MAX_STORED_LENGTH: usize = 255;

/// Unvalidated `{username, password}` candidate as received from a caller
///
/// Missing fields deserialize as empty strings so they fail the same rules.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct UserCandidate {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

impl UserCandidate {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// A single failing field and why it failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Structured validation failure listing every field that failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationFailure {
    errors: Vec<FieldError>,
}

impl ValidationFailure {
    pub fn new(errors: Vec<FieldError>) -> Self {
        Self { errors }
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Message for the given field, if it failed
    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }
}

impl std::fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let messages: Vec<&str> = self.errors.iter().map(|e| e.message.as_str()).collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for ValidationFailure {}

/// Reject values that would not fit the storage columns
///
/// Runs in the stores rather than in `validate_insert_user`, since the stored
/// password is usually a hash of the validated one.
pub fn check_stored_lengths(user: &InsertUser) -> Result<(), ValidationFailure> {
    for (field, value) in [("username", user.username()), ("password", user.password())] {
        if value.chars().count() > MAX_STORED_LENGTH {
            return Err(field_too_long(field));
        }
    }

    Ok(())
}

/// Failure for a value wider than its storage column
pub fn field_too_long(field: &str) -> ValidationFailure {
    let label = match field {
        "username" => "Username",
        "password" => "Password",
        other => other,
    };

    ValidationFailure::new(vec![FieldError::new(
        field,
        format!("{} must be at most {} characters", label, MAX_STORED_LENGTH),
    )])
}

/// Validate a candidate and produce an [`InsertUser`]
///
/// Rules:
/// - `username` must not be empty
/// - `password` must be at least 6 characters
///
/// Valid input is returned unchanged.
pub fn validate_insert_user(candidate: UserCandidate) -> Result<InsertUser, ValidationFailure> {
    match candidate.validate() {
        Ok(()) => Ok(InsertUser::new(candidate.username, candidate.password)),
        Err(errors) => Err(into_failure(&errors)),
    }
}

// Field order follows the payload, not the HashMap returned by validator
const FIELD_ORDER: [&str; 2] = ["username", "password"];

fn into_failure(errors: &ValidationErrors) -> ValidationFailure {
    let by_field = errors.field_errors();
    let mut result = Vec::new();

    for field in FIELD_ORDER {
        let Some(field_errors) = by_field
            .iter()
            .find(|(name, _)| name.to_string() == field)
            .map(|(_, errs)| *errs)
        else {
            continue;
        };

        for error in field_errors {
            let message = error
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| error.code.to_string());
            result.push(FieldError::new(field, message));
        }
    }

    ValidationFailure::new(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_candidate_is_unchanged() {
        let insert = validate_insert_user(UserCandidate::new("alice", "secret1")).unwrap();

        assert_eq!(insert.username(), "alice");
        assert_eq!(insert.password(), "secret1");
    }

    #[test]
    fn test_password_exactly_six_characters() {
        assert!(validate_insert_user(UserCandidate::new("bob", "123456")).is_ok());
    }

    #[test]
    fn test_valid_candidates_keep_whitespace_and_unicode() {
        for (username, password) in [("a", "      "), (" spaced ", "päss wörd"), ("ユーザー", "abcdef")] {
            let insert = validate_insert_user(UserCandidate::new(username, password)).unwrap();
            assert_eq!(insert.username(), username);
            assert_eq!(insert.password(), password);
        }
    }

    #[test]
    fn test_short_password() {
        for password in ["", "a", "12345"] {
            let failure = validate_insert_user(UserCandidate::new("alice", password)).unwrap_err();

            assert_eq!(failure.errors().len(), 1);
            assert_eq!(failure.message_for("password"), Some(PASSWORD_TOO_SHORT));
            assert_eq!(failure.message_for("username"), None);
        }
    }

    #[test]
    fn test_empty_username() {
        let failure = validate_insert_user(UserCandidate::new("", "secret1")).unwrap_err();

        assert_eq!(failure.errors().len(), 1);
        assert_eq!(failure.message_for("username"), Some(USERNAME_REQUIRED));
    }

    #[test]
    fn test_both_fields_fail() {
        let failure = validate_insert_user(UserCandidate::default()).unwrap_err();

        assert_eq!(
            failure.errors(),
            &[
                FieldError::new("username", USERNAME_REQUIRED),
                FieldError::new("password", PASSWORD_TOO_SHORT),
            ]
        );
        assert_eq!(
            failure.to_string(),
            "Username is required; Password must be at least 6 characters"
        );
    }

    #[test]
    fn test_missing_fields_deserialize_as_empty() {
        let candidate: UserCandidate = serde_json::from_str(r#"{"username":"alice"}"#).unwrap();
        let failure = validate_insert_user(candidate).unwrap_err();

        assert_eq!(failure.message_for("password"), Some(PASSWORD_TOO_SHORT));
    }

    #[test]
    fn test_stored_length_limit_counts_characters() {
        let fits = validate_insert_user(UserCandidate::new("é".repeat(255), "secret1")).unwrap();
        assert!(check_stored_lengths(&fits).is_ok());

        let wide = validate_insert_user(UserCandidate::new("u".repeat(256), "secret1")).unwrap();
        let failure = check_stored_lengths(&wide).unwrap_err();
        assert!(failure.message_for("username").is_some());

        let long_password = fits.with_password("p".repeat(256));
        let failure = check_stored_lengths(&long_password).unwrap_err();
        assert!(failure.message_for("password").is_some());
    }

    #[test]
    fn test_field_too_long_message() {
        let failure = field_too_long("username");

        assert_eq!(
            failure.message_for("username"),
            Some("Username must be at most 255 characters")
        );
    }
}
