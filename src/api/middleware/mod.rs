//! API middleware components

pub mod logging;
pub mod session_auth;

pub use logging::logging_middleware;
pub use session_auth::{log_in, log_out, session_user_id, RequireUser, USER_ID_KEY};
