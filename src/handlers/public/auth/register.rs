use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use serde::Deserialize;

use super::AuthSession;
use crate::auth::password::hash_password;
use crate::database::models::NewUser;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub email: Option<String>,
}

pub const USERNAME_MIN_CHARS: usize = 3;
pub const USERNAME_MAX_CHARS: usize = 50;
pub const PASSWORD_MIN_CHARS: usize = 6;
pub const EMAIL_MAX_CHARS: usize = 255;

/// Validated registration input
#[derive(Debug, PartialEq, Eq)]
struct Registration {
    username: String,
    email: Option<String>,
    password: String,
}

impl TryFrom<RegisterRequest> for Registration {
    type Error = ApiError;

    fn try_from(req: RegisterRequest) -> Result<Self, Self::Error> {
        let username = req.username.trim().to_string();
        let length = username.chars().count();
        if !(USERNAME_MIN_CHARS..=USERNAME_MAX_CHARS).contains(&length) {
            return Err(ApiError::bad_request(format!(
                "Username must be between {} and {} characters",
                USERNAME_MIN_CHARS, USERNAME_MAX_CHARS
            )));
        }

        if req.password.chars().count() < PASSWORD_MIN_CHARS {
            return Err(ApiError::bad_request(format!(
                "Password must be at least {} characters",
                PASSWORD_MIN_CHARS
            )));
        }

        let email = req
            .email
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty());
        if let Some(e) = &email {
            if !e.contains('@') {
                return Err(ApiError::bad_request("Invalid email address"));
            }
            if e.chars().count() > EMAIL_MAX_CHARS {
                return Err(ApiError::bad_request(format!(
                    "Email must be at most {} characters",
                    EMAIL_MAX_CHARS
                )));
            }
        }

        Ok(Self {
            username,
            email,
            password: req.password,
        })
    }
}

/// POST /api/auth/register - Create an account and sign it in
///
/// ```json
/// { "username": "string", "password": "string", "email": "string (optional)" }
/// ```
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<AuthSession> {
    let Json(req) = payload?;
    let registration = Registration::try_from(req)?;

    if state
        .store
        .find_user_by_username(&registration.username)
        .await?
        .is_some()
    {
        return Err(ApiError::conflict("Username is already taken"));
    }

    let password_hash = hash_password(registration.password, state.config.security.bcrypt_cost).await?;

    // A concurrent registration for the same name surfaces as a unique violation (409)
    let user = state
        .store
        .create_user(NewUser {
            username: registration.username,
            email: registration.email,
            password_hash,
        })
        .await?;

    let token = state.jwt.generate(user.id, &user.username)?;
    tracing::info!(user_id = user.id, "Registered user '{}'", user.username);

    Ok(ApiResponse::with_status(
        AuthSession {
            token,
            expires_in: state.jwt.expires_in(),
            user: user.into(),
        },
        StatusCode::CREATED,
    ))
}
