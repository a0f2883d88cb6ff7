//! User domain
//!
//! Domain types and traits for user accounts: the user entity, the
//! account-creation validation boundary, and the repository contract.

mod entity;
mod repository;
mod validation;

pub use entity::{InsertUser, User, UserId};
pub use repository::UserRepository;
pub use validation::{
    check_stored_lengths, field_too_long, validate_insert_user, FieldError, UserCandidate, ValidationFailure,
    MAX_STORED_LENGTH, PASSWORD_TOO_SHORT, USERNAME_REQUIRED,
};

#[cfg(test)]
pub use repository::MockUserRepository;
