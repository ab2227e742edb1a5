use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for a comment, joined with its author's username
///
/// `parent_id` points at another comment on the same post; top-level
/// comments have no parent.
#[derive(Debug, Clone, FromRow)]
pub struct CommentWithAuthor {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub author_username: String,
    pub parent_id: Option<Uuid>,
    pub content: String,
    pub date_posted: DateTime<Utc>,
}
