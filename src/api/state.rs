//! Application state shared by every handler

use std::sync::Arc;

use tracing::debug;

use crate::domain::user::UserRepository;
use crate::infrastructure::storage::{Readiness, SchemaState};
use crate::infrastructure::user::PasswordHasher;

/// Services injected at startup; cloned per request
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub hasher: Arc<dyn PasswordHasher>,
    pub readiness: Readiness,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<dyn PasswordHasher>,
        readiness: Readiness,
    ) -> Self {
        Self {
            users,
            hasher,
            readiness,
        }
    }

    /// Account store, once schema initialization has settled
    ///
    /// A failed initialization is not fatal here: queries go through and
    /// surface their own errors.
    pub async fn user_store(&self) -> &dyn UserRepository {
        if let SchemaState::Failed(reason) = self.readiness.wait().await {
            debug!(reason = %reason, "Serving with failed schema initialization");
        }

        self.users.as_ref()
    }
}
