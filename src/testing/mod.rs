//! In-memory store and request helpers for router-level tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use serde_json::Value;
use tokio::sync::RwLock;
use tower::ServiceExt;

use crate::auth::JwtManager;
use crate::config::AppConfig;
use crate::database::models::post::ANONYMOUS_AUTHOR;
use crate::database::models::{
    DailyCount, Document, DocumentDraft, DocumentPatch, DocumentStats, DocumentSummary, NewUser, Pagination, Post,
    User,
};
use crate::database::{DatabaseError, DocumentRepository, PostRepository, Store, UserRepository};
use crate::routes;
use crate::state::AppState;

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    documents: Vec<Document>,
    posts: Vec<Post>,
    next_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn author_name(&self, user_id: i64) -> String {
        self.users
            .iter()
            .find(|u| u.id == user_id)
            .map(|u| u.username.clone())
            .unwrap_or_else(|| ANONYMOUS_AUTHOR.to_string())
    }
}

/// Store double with the same observable behavior as `PgStore`.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    offline: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make every call fail the way an unreachable database does.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> Result<(), DatabaseError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(DatabaseError::Sqlx(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }

    pub async fn seed_post(&self, user_id: i64, title: &str, likes_count: i32) -> i64 {
        let mut tables = self.tables.write().await;
        let id = tables.next_id();
        let now = Utc::now();
        tables.posts.push(Post {
            id,
            user_id,
            title: title.to_string(),
            content: format!("{} body", title),
            media_type: None,
            media_url: None,
            likes_count,
            comments_count: 0,
            created_at: now + Duration::milliseconds(id),
            updated_at: now,
            author_name: String::new(),
            author_avatar: String::new(),
        });
        id
    }

    /// Move a document's `updated_at` back by whole days.
    pub async fn age_document(&self, id: i64, days: i64) {
        let mut tables = self.tables.write().await;
        if let Some(doc) = tables.documents.iter_mut().find(|d| d.id == id) {
            doc.updated_at = doc.updated_at - Duration::days(days);
        }
    }

    pub async fn likes_of(&self, id: i64) -> Option<i32> {
        let tables = self.tables.read().await;
        tables.posts.iter().find(|p| p.id == id).map(|p| p.likes_count)
    }
}

fn summary(doc: &Document) -> DocumentSummary {
    DocumentSummary {
        id: doc.id,
        user_id: doc.user_id,
        title: doc.title.clone(),
        filename: doc.filename.clone(),
        file_size: doc.file_size,
        created_at: doc.created_at,
        updated_at: doc.updated_at,
    }
}

fn newest_first(docs: &mut [DocumentSummary]) {
    docs.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(b.id.cmp(&a.id)));
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User, DatabaseError> {
        self.check_online()?;
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.username == user.username) {
            return Err(DatabaseError::UniqueViolation(format!("username '{}'", user.username)));
        }
        let now = Utc::now();
        let row = User {
            id: tables.next_id(),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            created_at: now,
            updated_at: now,
        };
        tables.users.push(row.clone());
        Ok(row)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        self.check_online()?;
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, DatabaseError> {
        self.check_online()?;
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }
}

#[async_trait]
impl DocumentRepository for MemoryStore {
    async fn create_document(&self, user_id: i64, draft: &DocumentDraft) -> Result<i64, DatabaseError> {
        self.check_online()?;
        let mut tables = self.tables.write().await;
        let id = tables.next_id();
        let now = Utc::now();
        tables.documents.push(Document {
            id,
            user_id,
            title: draft.title.clone(),
            filename: draft.filename.clone(),
            content: draft.content.clone(),
            file_size: draft.file_size,
            created_at: now,
            updated_at: now,
        });
        Ok(id)
    }

    async fn list_documents(&self, user_id: i64) -> Result<Vec<DocumentSummary>, DatabaseError> {
        self.check_online()?;
        let tables = self.tables.read().await;
        let mut docs: Vec<DocumentSummary> = tables
            .documents
            .iter()
            .filter(|d| d.user_id == user_id)
            .map(summary)
            .collect();
        newest_first(&mut docs);
        Ok(docs)
    }

    async fn get_document(&self, user_id: i64, id: i64) -> Result<Option<Document>, DatabaseError> {
        self.check_online()?;
        let tables = self.tables.read().await;
        Ok(tables
            .documents
            .iter()
            .find(|d| d.id == id && d.user_id == user_id)
            .cloned())
    }

    async fn update_document(
        &self,
        user_id: i64,
        id: i64,
        patch: &DocumentPatch,
    ) -> Result<Option<DocumentDraft>, DatabaseError> {
        self.check_online()?;
        let mut tables = self.tables.write().await;
        let Some(doc) = tables
            .documents
            .iter_mut()
            .find(|d| d.id == id && d.user_id == user_id)
        else {
            return Ok(None);
        };

        let draft = DocumentDraft::merge(&doc.title, &doc.content, patch);
        doc.title = draft.title.clone();
        doc.filename = draft.filename.clone();
        doc.content = draft.content.clone();
        doc.file_size = draft.file_size;
        doc.updated_at = Utc::now();
        Ok(Some(draft))
    }

    async fn delete_document(&self, user_id: i64, id: i64) -> Result<bool, DatabaseError> {
        self.check_online()?;
        let mut tables = self.tables.write().await;
        let before = tables.documents.len();
        tables.documents.retain(|d| !(d.id == id && d.user_id == user_id));
        Ok(tables.documents.len() < before)
    }

    async fn search_documents(&self, user_id: i64, keyword: &str) -> Result<Vec<DocumentSummary>, DatabaseError> {
        self.check_online()?;
        let needle = keyword.to_lowercase();
        let tables = self.tables.read().await;
        let mut docs: Vec<DocumentSummary> = tables
            .documents
            .iter()
            .filter(|d| d.user_id == user_id)
            .filter(|d| d.title.to_lowercase().contains(&needle) || d.filename.to_lowercase().contains(&needle))
            .map(summary)
            .collect();
        newest_first(&mut docs);
        Ok(docs)
    }

    async fn document_stats(&self, user_id: i64) -> Result<DocumentStats, DatabaseError> {
        self.check_online()?;
        let tables = self.tables.read().await;
        let today = Utc::now().date_naive();
        let window_start = today - Duration::days(6);

        let owned: Vec<&Document> = tables.documents.iter().filter(|d| d.user_id == user_id).collect();

        let mut by_day: BTreeMap<_, i64> = BTreeMap::new();
        for doc in &owned {
            let day = doc.updated_at.date_naive();
            if day >= window_start {
                *by_day.entry(day).or_default() += 1;
            }
        }

        Ok(DocumentStats {
            today_count: by_day.get(&today).copied().unwrap_or(0),
            total_count: owned.len() as i64,
            total_size: owned.iter().map(|d| d.file_size).sum(),
            daily: by_day
                .into_iter()
                .map(|(date, count)| DailyCount { date, count })
                .collect(),
        })
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn list_posts(&self, pagination: Pagination) -> Result<(Vec<Post>, i64), DatabaseError> {
        self.check_online()?;
        let tables = self.tables.read().await;
        let mut posts = tables.posts.clone();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = posts.len() as i64;
        let page = posts
            .into_iter()
            .skip(pagination.offset() as usize)
            .take(pagination.limit as usize)
            .map(|mut p| {
                p.author_name = tables.author_name(p.user_id);
                p.with_avatar()
            })
            .collect();
        Ok((page, total))
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, DatabaseError> {
        self.check_online()?;
        let tables = self.tables.read().await;
        Ok(tables.posts.iter().find(|p| p.id == id).cloned().map(|mut p| {
            p.author_name = tables.author_name(p.user_id);
            p.with_avatar()
        }))
    }

    async fn like_post(&self, id: i64) -> Result<Option<i32>, DatabaseError> {
        self.check_online()?;
        let mut tables = self.tables.write().await;
        Ok(tables.posts.iter_mut().find(|p| p.id == id).map(|p| {
            p.likes_count += 1;
            p.updated_at = Utc::now();
            p.likes_count
        }))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        self.check_online()
    }
}

pub const TEST_SECRET: &str = "test-secret";

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.security.jwt_secret = TEST_SECRET.to_string();
    // Lowest bcrypt cost keeps register/login tests fast
    config.security.bcrypt_cost = 4;
    config
}

/// Router over `store` with test settings.
pub fn test_app(store: Arc<MemoryStore>) -> Router {
    let config = test_config();
    let jwt = JwtManager::new(&config.security.jwt_secret, config.security.jwt_expiry_hours)
        .expect("test secret is non-empty");
    routes::app(AppState::new(store, jwt, Arc::new(config)))
}

/// Send one request through the router and decode the JSON body (`Null` when empty).
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("valid request");

    let response = app.clone().oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("readable body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}

/// Register through the API and return `(token, user_id)`.
pub async fn register(app: &Router, username: &str) -> (String, i64) {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(serde_json::json!({ "username": username, "password": "password123" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
    let token = body["data"]["token"].as_str().expect("token").to_string();
    let id = body["data"]["user"]["id"].as_i64().expect("user id");
    (token, id)
}
