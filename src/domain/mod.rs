//! Domain layer - entities, validation, and repository contracts

pub mod error;
pub mod user;

pub use error::DomainError;
pub use user::{InsertUser, User, UserId, UserRepository};
