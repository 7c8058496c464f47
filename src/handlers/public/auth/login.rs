use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Deserialize;

use super::AuthSession;
use crate::auth::password::verify_password;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

const BAD_CREDENTIALS: &str = "Invalid username or password";

/// POST /api/auth/login - Authenticate user and receive JWT token
///
/// ```json
/// { "username": "string", "password": "string" }
/// ```
///
/// Unknown users and wrong passwords get the same 401 so the response does
/// not reveal which usernames exist.
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<AuthSession> {
    let Json(req) = payload?;

    let username = req.username.trim();
    if username.is_empty() || req.password.is_empty() {
        return Err(ApiError::bad_request("Username and password are required"));
    }

    let Some(user) = state.store.find_user_by_username(username).await? else {
        tracing::info!("Login failed: unknown user '{}'", username);
        return Err(ApiError::unauthorized(BAD_CREDENTIALS));
    };

    if !verify_password(req.password, user.password_hash.clone()).await? {
        tracing::info!("Login failed: wrong password for '{}'", username);
        return Err(ApiError::unauthorized(BAD_CREDENTIALS));
    }

    let token = state.jwt.generate(user.id, &user.username)?;
    tracing::info!(user_id = user.id, "User '{}' logged in", user.username);

    Ok(ApiResponse::success(AuthSession {
        token,
        expires_in: state.jwt.expires_in(),
        user: user.into(),
    }))
}
