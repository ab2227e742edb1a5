use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::comments::models::CommentWithAuthor;

/// Request DTO for creating a comment on a post
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentDto {
    #[validate(length(min = 1, max = 10000, message = "Content must be 1-10000 characters"))]
    pub content: String,

    /// Comment being replied to; must belong to the same post
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Uuid>,
}

/// Flat response DTO for a comment
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponseDto {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub author_username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Uuid>,
    pub content: String,
    pub date_posted: DateTime<Utc>,
}

impl From<CommentWithAuthor> for CommentResponseDto {
    fn from(comment: CommentWithAuthor) -> Self {
        Self {
            id: comment.id,
            post_id: comment.post_id,
            author_id: comment.author_id,
            author_username: comment.author_username,
            parent_id: comment.parent_id,
            content: comment.content,
            date_posted: comment.date_posted,
        }
    }
}

/// Nested response DTO for a comment and its replies
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentTreeDto {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub author_username: String,
    pub content: String,
    pub date_posted: DateTime<Utc>,
    pub replies: Vec<CommentTreeDto>,
}

impl From<CommentWithAuthor> for CommentTreeDto {
    fn from(comment: CommentWithAuthor) -> Self {
        Self {
            id: comment.id,
            post_id: comment.post_id,
            author_id: comment.author_id,
            author_username: comment.author_username,
            content: comment.content,
            date_posted: comment.date_posted,
            replies: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_comment_dto_rejects_empty_content() {
        let dto = CreateCommentDto {
            content: String::new(),
            parent_id: None,
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_create_comment_dto_valid_reply() {
        let dto = CreateCommentDto {
            content: "I disagree".to_string(),
            parent_id: Some(Uuid::new_v4()),
        };
        assert!(dto.validate().is_ok());
    }
}
