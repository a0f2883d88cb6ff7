//! Infrastructure layer - storage backends, sessions, logging

pub mod logging;
pub mod session;
pub mod storage;
pub mod user;
