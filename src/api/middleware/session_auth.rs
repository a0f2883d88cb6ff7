//! Cookie-session authentication

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;
use tracing::{debug, warn};

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::user::{User, UserId};

/// Session key holding the logged-in account id
pub const USER_ID_KEY: &str = "user_id";

const NOT_AUTHENTICATED: &str = "Not authenticated";

/// Extractor that requires a session bound to an existing account
#[derive(Debug, Clone)]
pub struct RequireUser {
    pub user: User,
    pub session: Session,
}

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, message)| ApiError::internal(message))?;

        let id = session_user_id(&session)
            .await?
            .ok_or_else(|| ApiError::unauthorized(NOT_AUTHENTICATED))?;

        let user = state
            .user_store()
            .await
            .get(id)
            .await?
            .ok_or_else(|| {
                debug!(user_id = %id, "Session refers to a missing account");
                ApiError::unauthorized(NOT_AUTHENTICATED)
            })?;

        Ok(Self { user, session })
    }
}

/// Account id stored in the session, if any
pub async fn session_user_id(session: &Session) -> Result<Option<UserId>, ApiError> {
    let raw: Option<i64> = session.get(USER_ID_KEY).await.map_err(|e| {
        warn!(error = %e, "Failed to read session");
        ApiError::unavailable("Session store unavailable")
    })?;

    // A malformed id is treated as logged out
    Ok(raw.and_then(|id| UserId::new(id).ok()))
}

/// Bind the session to an account, rotating the session id first
pub async fn log_in(session: &Session, user: &User) -> Result<(), ApiError> {
    session.cycle_id().await.map_err(session_error)?;
    session
        .insert(USER_ID_KEY, user.id().value())
        .await
        .map_err(session_error)
}

/// Drop the session and its stored record
pub async fn log_out(session: &Session) -> Result<(), ApiError> {
    session.flush().await.map_err(session_error)
}

fn session_error(e: tower_sessions::session::Error) -> ApiError {
    warn!(error = %e, "Session store operation failed");
    ApiError::unavailable("Session store unavailable")
}
