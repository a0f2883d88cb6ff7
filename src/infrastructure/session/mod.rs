//! Session persistence backends

mod mysql_store;

pub use mysql_store::MySqlSessionStore;
