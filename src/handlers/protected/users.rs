use axum::extract::State;

use crate::database::models::UserProfile;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

/// GET /api/users/profile - the authenticated account
pub async fn profile(State(state): State<AppState>, auth: AuthUser) -> ApiResult<UserProfile> {
    let user = state
        .store
        .find_user_by_id(auth.user_id)
        .await?
        .ok_or_else(|| {
            tracing::warn!("Token for user {} refers to a missing account", auth.user_id);
            ApiError::not_found("User not found")
        })?;

    Ok(ApiResponse::success(user.into()))
}
