use async_trait::async_trait;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    Document, DocumentDraft, DocumentPatch, DocumentStats, DocumentSummary, NewUser, Pagination, Post, User,
};

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert an account. A taken username yields [`DatabaseError::UniqueViolation`].
    async fn create_user(&self, user: NewUser) -> Result<User, DatabaseError>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError>;

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, DatabaseError>;
}

/// Document storage. Every call is scoped to `user_id`; rows owned by other
/// users behave exactly like missing rows.
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    async fn create_document(&self, user_id: i64, draft: &DocumentDraft) -> Result<i64, DatabaseError>;

    /// Newest `updated_at` first.
    async fn list_documents(&self, user_id: i64) -> Result<Vec<DocumentSummary>, DatabaseError>;

    async fn get_document(&self, user_id: i64, id: i64) -> Result<Option<Document>, DatabaseError>;

    /// Merge `patch` into the stored row and write it back. `None` when the row is not found.
    async fn update_document(
        &self,
        user_id: i64,
        id: i64,
        patch: &DocumentPatch,
    ) -> Result<Option<DocumentDraft>, DatabaseError>;

    /// `false` when nothing was deleted.
    async fn delete_document(&self, user_id: i64, id: i64) -> Result<bool, DatabaseError>;

    /// Case-insensitive substring match on title or filename, newest first.
    async fn search_documents(&self, user_id: i64, keyword: &str) -> Result<Vec<DocumentSummary>, DatabaseError>;

    async fn document_stats(&self, user_id: i64) -> Result<DocumentStats, DatabaseError>;
}

#[async_trait]
pub trait PostRepository: Send + Sync {
    /// One page of posts, newest first, plus the total post count.
    async fn list_posts(&self, pagination: Pagination) -> Result<(Vec<Post>, i64), DatabaseError>;

    async fn get_post(&self, id: i64) -> Result<Option<Post>, DatabaseError>;

    /// Increment the like counter by one and return the new value. `None` when the post does not exist.
    async fn like_post(&self, id: i64) -> Result<Option<i32>, DatabaseError>;
}

/// Everything the HTTP layer needs from storage.
#[async_trait]
pub trait Store: UserRepository + DocumentRepository + PostRepository {
    async fn ping(&self) -> Result<(), DatabaseError>;
}

/// `ILIKE` pattern matching `keyword` anywhere, with wildcard characters taken literally.
pub fn contains_pattern(keyword: &str) -> String {
    let mut pattern = String::with_capacity(keyword.len() + 2);
    pattern.push('%');
    for c in keyword.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
