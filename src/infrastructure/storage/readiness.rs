//! Readiness gate for detached schema initialization

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;
use tracing::{error, info};

use crate::domain::user::UserRepository;
use crate::domain::DomainError;

/// Lifecycle of the backing schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "error", rename_all = "snake_case")]
pub enum SchemaState {
    Initializing,
    Ready,
    Failed(String),
}

impl SchemaState {
    pub fn is_settled(&self) -> bool {
        !matches!(self, Self::Initializing)
    }
}

/// Awaitable view of the schema state, cheap to clone into handlers
#[derive(Debug, Clone)]
pub struct Readiness {
    rx: watch::Receiver<SchemaState>,
}

/// Write side of the gate, consumed when initialization finishes
#[derive(Debug)]
pub struct ReadinessReporter {
    tx: watch::Sender<SchemaState>,
}

pub fn readiness_channel() -> (ReadinessReporter, Readiness) {
    let (tx, rx) = watch::channel(SchemaState::Initializing);
    (ReadinessReporter { tx }, Readiness { rx })
}

impl Readiness {
    /// A gate that is already open
    pub fn ready() -> Self {
        let (reporter, readiness) = readiness_channel();
        reporter.finish(Ok(()));
        readiness
    }

    /// Current state without waiting
    pub fn state(&self) -> SchemaState {
        self.rx.borrow().clone()
    }

    /// Wait until initialization has finished, successfully or not
    pub async fn wait(&self) -> SchemaState {
        let mut rx = self.rx.clone();

        match rx.wait_for(SchemaState::is_settled).await {
            Ok(state) => state.clone(),
            Err(_) => SchemaState::Failed(
                "Schema initialization ended without reporting".to_string(),
            ),
        }
    }
}

impl ReadinessReporter {
    pub fn finish(self, result: Result<(), DomainError>) {
        let state = match result {
            Ok(()) => SchemaState::Ready,
            Err(e) => SchemaState::Failed(e.to_string()),
        };

        self.tx.send_replace(state);
    }
}

/// Run `ensure_schema` in the background and return the gate
///
/// A failure is logged and recorded; it never stops the process.
pub fn spawn_schema_init(users: Arc<dyn UserRepository>) -> Readiness {
    let (reporter, readiness) = readiness_channel();

    tokio::spawn(async move {
        info!("Creating users table if not exists");
        let result = users.ensure_schema().await;

        if let Err(e) = &result {
            error!(error = %e, "Database initialization failed, continuing to serve");
        }

        reporter.finish(result);
    });

    readiness
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::MockUserRepository;
    use crate::infrastructure::user::InMemoryUserRepository;

    #[tokio::test]
    async fn test_gate_starts_initializing() {
        let (_reporter, readiness) = readiness_channel();
        assert_eq!(readiness.state(), SchemaState::Initializing);
    }

    #[tokio::test]
    async fn test_wait_resolves_after_finish() {
        let (reporter, readiness) = readiness_channel();
        let waiter = tokio::spawn({
            let readiness = readiness.clone();
            async move { readiness.wait().await }
        });

        reporter.finish(Ok(()));

        assert_eq!(waiter.await.unwrap(), SchemaState::Ready);
        assert_eq!(readiness.state(), SchemaState::Ready);
    }

    #[tokio::test]
    async fn test_dropped_reporter_settles_as_failed() {
        let (reporter, readiness) = readiness_channel();
        drop(reporter);

        assert!(matches!(readiness.wait().await, SchemaState::Failed(_)));
    }

    #[tokio::test]
    async fn test_ready_gate_is_open() {
        assert_eq!(Readiness::ready().wait().await, SchemaState::Ready);
    }

    #[tokio::test]
    async fn test_spawn_schema_init_success() {
        let readiness = spawn_schema_init(Arc::new(InMemoryUserRepository::new()));
        assert_eq!(readiness.wait().await, SchemaState::Ready);
    }

    #[tokio::test]
    async fn test_spawn_schema_init_failure_is_recorded() {
        let mut mock = MockUserRepository::new();
        mock.expect_ensure_schema()
            .times(1)
            .returning(|| Err(DomainError::storage_unavailable("connection refused")));

        let readiness = spawn_schema_init(Arc::new(mock));

        match readiness.wait().await {
            SchemaState::Failed(message) => assert!(message.contains("connection refused")),
            other => panic!("Expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_state_serialization() {
        assert_eq!(
            serde_json::to_string(&SchemaState::Ready).unwrap(),
            r#"{"state":"ready"}"#
        );
        assert_eq!(
            serde_json::to_string(&SchemaState::Failed("boom".to_string())).unwrap(),
            r#"{"state":"failed","error":"boom"}"#
        );
    }
}
