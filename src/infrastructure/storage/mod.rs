//! Storage infrastructure - pool ownership and schema readiness

mod mysql;
mod readiness;

pub use mysql::MySqlStorage;
pub use readiness::{readiness_channel, spawn_schema_init, Readiness, ReadinessReporter, SchemaState};
