use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::manager::DatabaseError;
use crate::database::models::post::ANONYMOUS_AUTHOR;
use crate::database::models::{
    DailyCount, Document, DocumentDraft, DocumentPatch, DocumentStats, DocumentSummary, NewUser, Pagination, Post,
    User,
};
use crate::database::repository::{contains_pattern, DocumentRepository, PostRepository, Store, UserRepository};

const USER_COLUMNS: &str = "id, username, email, password_hash, created_at, updated_at";

const SUMMARY_COLUMNS: &str = "id, user_id, title, filename, file_size, created_at, updated_at";

const DOCUMENT_COLUMNS: &str = "id, user_id, title, filename, content, file_size, created_at, updated_at";

const POST_SELECT: &str = r#"
    SELECT p.id, p.user_id, p.title, p.content, p.media_type, p.media_url,
           p.likes_count, p.comments_count, p.created_at, p.updated_at,
           COALESCE(u.username, $1) AS author_name
    FROM posts p
    LEFT JOIN users u ON p.user_id = u.id
"#;

/// PostgreSQL-backed store; one parameterized statement per operation
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn create_user(&self, user: NewUser) -> Result<User, DatabaseError> {
        let sql = format!(
            "INSERT INTO users (username, email, password_hash) VALUES ($1, $2, $3) RETURNING {}",
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                    DatabaseError::UniqueViolation(format!("username '{}'", user.username))
                }
                other => DatabaseError::Sqlx(other),
            })
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }
}

#[async_trait]
impl DocumentRepository for PgStore {
    async fn create_document(&self, user_id: i64, draft: &DocumentDraft) -> Result<i64, DatabaseError> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO documents (user_id, title, filename, content, file_size) \
             VALUES ($1, $2, $3, $4, $5) RETURNING id",
        )
        .bind(user_id)
        .bind(&draft.title)
        .bind(&draft.filename)
        .bind(&draft.content)
        .bind(draft.file_size)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    async fn list_documents(&self, user_id: i64) -> Result<Vec<DocumentSummary>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM documents WHERE user_id = $1 ORDER BY updated_at DESC, id DESC",
            SUMMARY_COLUMNS
        );
        let rows = sqlx::query_as::<_, DocumentSummary>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn get_document(&self, user_id: i64, id: i64) -> Result<Option<Document>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM documents WHERE id = $1 AND user_id = $2",
            DOCUMENT_COLUMNS
        );
        let doc = sqlx::query_as::<_, Document>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(doc)
    }

    async fn update_document(
        &self,
        user_id: i64,
        id: i64,
        patch: &DocumentPatch,
    ) -> Result<Option<DocumentDraft>, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        // Row lock keeps a concurrent update from interleaving with the merge
        let current = sqlx::query_as::<_, (String, String)>(
            "SELECT title, content FROM documents WHERE id = $1 AND user_id = $2 FOR UPDATE",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((current_title, current_content)) = current else {
            return Ok(None);
        };

        let draft = DocumentDraft::merge(&current_title, &current_content, patch);

        sqlx::query(
            "UPDATE documents SET title = $1, filename = $2, content = $3, file_size = $4, updated_at = NOW() \
             WHERE id = $5 AND user_id = $6",
        )
        .bind(&draft.title)
        .bind(&draft.filename)
        .bind(&draft.content)
        .bind(draft.file_size)
        .bind(id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(draft))
    }

    async fn delete_document(&self, user_id: i64, id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM documents WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn search_documents(&self, user_id: i64, keyword: &str) -> Result<Vec<DocumentSummary>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM documents WHERE user_id = $1 AND (title ILIKE $2 OR filename ILIKE $2) \
             ORDER BY updated_at DESC, id DESC",
            SUMMARY_COLUMNS
        );
        let rows = sqlx::query_as::<_, DocumentSummary>(&sql)
            .bind(user_id)
            .bind(contains_pattern(keyword))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn document_stats(&self, user_id: i64) -> Result<DocumentStats, DatabaseError> {
        let (total_count, total_size) = sqlx::query_as::<_, (i64, i64)>(
            "SELECT COUNT(*), COALESCE(SUM(file_size), 0)::BIGINT FROM documents WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        let today_count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM documents WHERE user_id = $1 AND updated_at::date = CURRENT_DATE",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        let daily = sqlx::query_as::<_, DailyCount>(
            r#"
            SELECT updated_at::date AS date, COUNT(*) AS count
            FROM documents
            WHERE user_id = $1 AND updated_at >= CURRENT_DATE - 6
            GROUP BY updated_at::date
            ORDER BY date
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(DocumentStats {
            today_count,
            total_count,
            total_size,
            daily,
        })
    }
}

#[async_trait]
impl PostRepository for PgStore {
    async fn list_posts(&self, pagination: Pagination) -> Result<(Vec<Post>, i64), DatabaseError> {
        let sql = format!(
            "{} ORDER BY p.created_at DESC, p.id DESC LIMIT $2 OFFSET $3",
            POST_SELECT
        );
        let posts = sqlx::query_as::<_, Post>(&sql)
            .bind(ANONYMOUS_AUTHOR)
            .bind(pagination.limit)
            .bind(pagination.offset())
            .fetch_all(&self.pool)
            .await?;

        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM posts")
            .fetch_one(&self.pool)
            .await?;

        Ok((posts.into_iter().map(Post::with_avatar).collect(), total))
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, DatabaseError> {
        let sql = format!("{} WHERE p.id = $2", POST_SELECT);
        let post = sqlx::query_as::<_, Post>(&sql)
            .bind(ANONYMOUS_AUTHOR)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(post.map(Post::with_avatar))
    }

    async fn like_post(&self, id: i64) -> Result<Option<i32>, DatabaseError> {
        let count = sqlx::query_scalar::<_, i32>(
            "UPDATE posts SET likes_count = likes_count + 1, updated_at = NOW() WHERE id = $1 RETURNING likes_count",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(count)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
