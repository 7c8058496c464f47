use axum::extract::{Path, State};

use crate::database::models::LikeResult;
use crate::error::ApiError;
use crate::handlers::parse_id;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

/// POST /api/posts/:id/like - add one like and return the new total
///
/// Likes are not deduplicated per user; every call counts.
pub async fn like(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<LikeResult> {
    let id = parse_id(&id, "post")?;

    let likes_count = state
        .store
        .like_post(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Post not found"))?;

    tracing::debug!(post_id = id, user_id = auth.user_id, likes_count, "Post liked");

    Ok(ApiResponse::success(LikeResult { likes_count }))
}
