use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for a post, joined with its author's username and the
/// number of comments in its thread
#[derive(Debug, Clone, FromRow)]
pub struct PostWithAuthor {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author_id: Uuid,
    pub author_username: String,
    pub views: i64,
    pub comment_count: i64,
    pub date_posted: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
