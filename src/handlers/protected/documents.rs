// handlers/protected/documents.rs - /api/documents/* handlers
//
// All queries are owner-scoped: a document that belongs to someone else is
// reported exactly like one that does not exist.

use axum::extract::{
    rejection::{JsonRejection, QueryRejection},
    Path, Query, State,
};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::models::{
    Document, DocumentDraft, DocumentPatch, DocumentStats, DocumentSummary, SavedDocument,
};
use crate::error::ApiError;
use crate::handlers::parse_id;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

fn not_found() -> ApiError {
    ApiError::not_found("Document not found")
}

/// POST /api/documents/upload - create a document
pub async fn upload(
    State(state): State<AppState>,
    auth: AuthUser,
    payload: Result<Json<UploadRequest>, JsonRejection>,
) -> ApiResult<SavedDocument> {
    let Json(req) = payload?;

    let draft = DocumentDraft::new(&req.title, req.content)?;

    let id = state.store.create_document(auth.user_id, &draft).await?;
    tracing::info!(user_id = auth.user_id, document_id = id, "Created document '{}'", draft.filename);

    Ok(ApiResponse::success(draft.saved(id)))
}

/// GET /api/documents/list - caller's documents, most recently updated first
pub async fn list(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Vec<DocumentSummary>> {
    let documents = state.store.list_documents(auth.user_id).await?;
    Ok(ApiResponse::success(documents))
}

/// GET /api/documents/:id - one document with content
pub async fn get(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Document> {
    let id = parse_id(&id, "document")?;

    let document = state
        .store
        .get_document(auth.user_id, id)
        .await?
        .ok_or_else(not_found)?;

    Ok(ApiResponse::success(document))
}

/// PUT /api/documents/:id - partial update; blank fields keep their stored value
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    payload: Result<Json<DocumentPatch>, JsonRejection>,
) -> ApiResult<SavedDocument> {
    let id = parse_id(&id, "document")?;
    let Json(patch) = payload?;
    patch.validate()?;

    let draft = state
        .store
        .update_document(auth.user_id, id, &patch)
        .await?
        .ok_or_else(not_found)?;

    Ok(ApiResponse::success(draft.saved(id)))
}

/// DELETE /api/documents/:id
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let id = parse_id(&id, "document")?;

    if !state.store.delete_document(auth.user_id, id).await? {
        return Err(not_found());
    }

    tracing::info!(user_id = auth.user_id, document_id = id, "Deleted document");
    Ok(ApiResponse::success(json!({ "message": "Document deleted" })))
}

/// GET /api/documents/search?q= - substring match on title or filename
pub async fn search(
    State(state): State<AppState>,
    auth: AuthUser,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> ApiResult<Vec<DocumentSummary>> {
    let Query(query) = query?;

    let keyword = query.q.as_deref().map(str::trim).unwrap_or_default();
    if keyword.is_empty() {
        return Ok(ApiResponse::success(Vec::new()));
    }

    let documents = state.store.search_documents(auth.user_id, keyword).await?;
    Ok(ApiResponse::success(documents))
}

/// GET /api/documents/stats - counts and sizes for the caller's documents
pub async fn stats(State(state): State<AppState>, auth: AuthUser) -> ApiResult<DocumentStats> {
    let stats = state.store.document_stats(auth.user_id).await?;
    Ok(ApiResponse::success(stats))
}
