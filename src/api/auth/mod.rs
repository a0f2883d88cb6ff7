//! Account endpoints: register, login, logout and current user
//!
//! Authentication state lives in a server-side session keyed by the
//! session cookie.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::{info, warn};

use crate::api::middleware::{log_in, log_out, RequireUser};
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::user::{validate_insert_user, User, UserCandidate};
use crate::domain::DomainError;

const INVALID_CREDENTIALS: &str = "Invalid username or password";

pub fn create_auth_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/user", get(current_user))
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Account as exposed over HTTP; never carries the password
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().value(),
            username: user.username().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub message: String,
}

/// POST /api/register
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Json(candidate): Json<UserCandidate>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let insert = validate_insert_user(candidate).map_err(DomainError::from)?;
    let users = state.user_store().await;

    if users.get_by_username(insert.username()).await?.is_some() {
        return Err(DomainError::duplicate_username(insert.username()).into());
    }

    let hashed = state.hasher.hash(insert.password())?;
    let user = users.create(insert.with_password(hashed)).await?;

    log_in(&session, &user).await?;
    info!(user_id = %user.id(), "Account registered");

    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<LoginRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .user_store()
        .await
        .get_by_username(&request.username)
        .await?
        .filter(|user| state.hasher.verify(&request.password, user.password()))
        .ok_or_else(|| {
            warn!("Rejected login attempt");
            ApiError::unauthorized(INVALID_CREDENTIALS)
        })?;

    log_in(&session, &user).await?;
    info!(user_id = %user.id(), "User logged in");

    Ok(Json(UserResponse::from(&user)))
}

/// POST /api/logout
///
/// Succeeds whether or not a user was logged in.
pub async fn logout(session: Session) -> Result<Json<LogoutResponse>, ApiError> {
    log_out(&session).await?;

    Ok(Json(LogoutResponse {
        message: "Logged out successfully".to_string(),
    }))
}

/// GET /api/user
pub async fn current_user(RequireUser { user, .. }: RequireUser) -> Json<UserResponse> {
    Json(UserResponse::from(&user))
}
