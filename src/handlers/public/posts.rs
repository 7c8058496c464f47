use axum::extract::{rejection::QueryRejection, Path, Query, State};

use crate::database::models::{PageQuery, Pagination, Post, PostPage};
use crate::error::ApiError;
use crate::handlers::parse_id;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /api/posts?page=&limit= - public feed, newest first
pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResult<PostPage> {
    let Query(query) = query?;
    let pagination = Pagination::from_query(
        &query,
        state.config.posts.default_limit,
        state.config.posts.max_limit,
    );

    let (list, total) = state.store.list_posts(pagination).await?;

    Ok(ApiResponse::success(PostPage {
        list,
        total,
        page: pagination.page,
        limit: pagination.limit,
    }))
}

/// GET /api/posts/:id - single post with author
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Post> {
    let id = parse_id(&id, "post")?;

    let post = state
        .store
        .get_post(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Post not found"))?;

    Ok(ApiResponse::success(post))
}
