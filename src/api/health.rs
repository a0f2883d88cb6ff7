//! Health check endpoints for liveness and readiness probes

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;

use super::state::AppState;
use crate::api::types::Json;
use crate::infrastructure::storage::SchemaState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaState>,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Starting,
    Unhealthy,
}

/// Returns 200 while the process is up
pub async fn health_check() -> impl IntoResponse {
    let response = HealthResponse {
        status: HealthStatus::Healthy,
        version: env!("CARGO_PKG_VERSION").to_string(),
        schema: None,
    };

    (StatusCode::OK, Json(response))
}

/// Reports whether schema initialization has completed
///
/// Does not wait: 503 while initializing or after a failed initialization.
pub async fn ready_check(State(state): State<AppState>) -> impl IntoResponse {
    let schema = state.readiness.state();

    let (status_code, status) = match schema {
        SchemaState::Ready => (StatusCode::OK, HealthStatus::Healthy),
        SchemaState::Initializing => (StatusCode::SERVICE_UNAVAILABLE, HealthStatus::Starting),
        SchemaState::Failed(_) => (StatusCode::SERVICE_UNAVAILABLE, HealthStatus::Unhealthy),
    };

    let response = HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        schema: Some(schema),
    };

    (status_code, Json(response))
}

pub async fn live_check() -> impl IntoResponse {
    StatusCode::OK
}
