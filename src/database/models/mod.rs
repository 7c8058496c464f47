pub mod document;
pub mod post;
pub mod user;

pub use document::{
    DailyCount, Document, DocumentDraft, DocumentPatch, DocumentStats, DocumentSummary, DraftError, SavedDocument,
};
pub use post::{LikeResult, PageQuery, Pagination, Post, PostPage};
pub use user::{NewUser, User, UserProfile};
