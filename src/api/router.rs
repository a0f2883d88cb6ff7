use axum::{middleware, routing::get, Router};
use time::Duration;
use tower_http::trace::TraceLayer;
use tower_sessions::{session_store::SessionStore, Expiry, SessionManagerLayer};

use super::auth;
use super::health;
use super::middleware::logging_middleware;
use super::state::AppState;
use super::types::ApiError;
use crate::config::SessionConfig;

/// Build the full router over the given session store
pub fn create_router<S>(state: AppState, session_store: S, session: &SessionConfig) -> Router
where
    S: SessionStore + Clone,
{
    let sessions = SessionManagerLayer::new(session_store)
        .with_name(session.cookie_name.clone())
        .with_secure(session.secure_cookie)
        .with_expiry(Expiry::OnInactivity(Duration::seconds(
            session.inactivity_secs,
        )));

    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        .nest("/api", auth::create_auth_router().layer(sessions))
        .fallback(not_found)
        .with_state(state)
        .layer(middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
}

async fn not_found() -> ApiError {
    ApiError::not_found("Not found")
}
