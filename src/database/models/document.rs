use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;

pub const MARKDOWN_EXTENSION: &str = ".md";

/// Width of the `title` and `filename` columns.
pub const FILENAME_MAX_CHARS: usize = 255;

/// Longest title whose derived filename still fits its column.
pub const TITLE_MAX_CHARS: usize = FILENAME_MAX_CHARS - MARKDOWN_EXTENSION.len();

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DraftError {
    #[error("Document title must not be empty")]
    EmptyTitle,

    #[error("Document title must be at most {} characters", TITLE_MAX_CHARS)]
    TitleTooLong,
}

/// Full document row, content included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Document {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub filename: String,
    pub content: String,
    pub file_size: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing view of a document; content is left out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct DocumentSummary {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub filename: String,
    pub file_size: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Result of a create or update: the derived fields a client needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedDocument {
    pub id: i64,
    pub title: String,
    pub filename: String,
    pub file_size: i64,
}

/// Title, filename, content and size that are written together.
///
/// Built only through [`DocumentDraft::new`] or [`DocumentDraft::merge`], so the
/// filename always carries the markdown extension and `file_size` always
/// matches the content's byte length.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentDraft {
    pub title: String,
    pub filename: String,
    pub content: String,
    pub file_size: i64,
}

impl DocumentDraft {
    pub fn new(title: &str, content: Option<String>) -> Result<Self, DraftError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(DraftError::EmptyTitle);
        }
        check_title_length(title)?;
        Ok(Self::build(title.to_string(), content.unwrap_or_default()))
    }

    /// Apply a partial update on top of the stored title and content.
    /// A blank title or an empty content keeps the current value.
    /// The patch must have passed [`DocumentPatch::validate`].
    pub fn merge(current_title: &str, current_content: &str, patch: &DocumentPatch) -> Self {
        let title = match patch.title.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => current_title.to_string(),
        };
        let content = match patch.content.as_deref() {
            Some(c) if !c.is_empty() => c.to_string(),
            _ => current_content.to_string(),
        };
        Self::build(title, content)
    }

    fn build(title: String, content: String) -> Self {
        let filename = derive_filename(&title);
        let file_size = content.len() as i64;
        Self {
            title,
            filename,
            content,
            file_size,
        }
    }

    pub fn saved(&self, id: i64) -> SavedDocument {
        SavedDocument {
            id,
            title: self.title.clone(),
            filename: self.filename.clone(),
            file_size: self.file_size,
        }
    }
}

/// Partial update request body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl DocumentPatch {
    /// Reject a replacement title that would not fit once stored.
    pub fn validate(&self) -> Result<(), DraftError> {
        match self.title.as_deref().map(str::trim) {
            Some(title) if !title.is_empty() => check_title_length(title),
            _ => Ok(()),
        }
    }
}

fn check_title_length(title: &str) -> Result<(), DraftError> {
    // Titles already ending in `.md` are stored as their own filename
    let max = if derive_filename(title) == title {
        FILENAME_MAX_CHARS
    } else {
        TITLE_MAX_CHARS
    };
    if title.chars().count() > max {
        return Err(DraftError::TitleTooLong);
    }
    Ok(())
}

/// Filename for a title: the title itself, with `.md` appended unless it already ends in it.
pub fn derive_filename(title: &str) -> String {
    if title.to_lowercase().ends_with(MARKDOWN_EXTENSION) {
        title.to_string()
    } else {
        format!("{}{}", title, MARKDOWN_EXTENSION)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentStats {
    pub today_count: i64,
    pub total_count: i64,
    pub total_size: i64,
    pub daily: Vec<DailyCount>,
}
