use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const ANONYMOUS_AUTHOR: &str = "anonymous";

/// Community post as returned to clients, with its author resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Post {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
    pub likes_count: i32,
    pub comments_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub author_name: String,
    #[sqlx(skip)]
    #[serde(default)]
    pub author_avatar: String,
}

impl Post {
    pub fn with_avatar(mut self) -> Self {
        self.author_avatar = avatar_url(&self.author_name);
        self
    }
}

/// Generated avatar image for an author name.
pub fn avatar_url(author_name: &str) -> String {
    let name: String = url::form_urlencoded::byte_serialize(author_name.as_bytes()).collect();
    format!("https://ui-avatars.com/api/?name={}&background=random", name)
}

/// Page of posts plus the paging values actually applied.
#[derive(Debug, Clone, Serialize)]
pub struct PostPage {
    pub list: Vec<Post>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LikeResult {
    pub likes_count: i32,
}

/// Raw `page`/`limit` query values. Kept as strings so that junk input falls
/// back to defaults instead of rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
}

impl Pagination {
    /// Page below 1 becomes 1; a limit outside `1..=max_limit` becomes `default_limit`.
    pub fn from_query(query: &PageQuery, default_limit: i64, max_limit: i64) -> Self {
        let page = query
            .page
            .as_deref()
            .and_then(|p| p.trim().parse::<i64>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1);
        let limit = query
            .limit
            .as_deref()
            .and_then(|l| l.trim().parse::<i64>().ok())
            .filter(|l| (1..=max_limit).contains(l))
            .unwrap_or(default_limit);
        Self { page, limit }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}
