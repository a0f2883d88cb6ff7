//! User infrastructure module
//!
//! Account storage backends (MySQL and in-memory) and password hashing.

mod mysql_repository;
mod password;
mod repository;

pub use mysql_repository::{MySqlUserRepository, CREATE_USERS_TABLE};
pub use password::{Argon2Hasher, PasswordHasher};
pub use repository::InMemoryUserRepository;
