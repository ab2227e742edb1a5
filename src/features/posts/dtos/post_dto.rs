use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::posts::models::PostWithAuthor;

/// Request DTO for creating a post
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostDto {
    #[validate(length(min = 1, max = 100, message = "Title must be 1-100 characters"))]
    pub title: String,

    #[validate(length(min = 1, max = 20000, message = "Content must be 1-20000 characters"))]
    pub content: String,
}

/// Request DTO for updating a post
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostDto {
    #[validate(length(min = 1, max = 100, message = "Title must be 1-100 characters"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[validate(length(min = 1, max = 20000, message = "Content must be 1-20000 characters"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// Response DTO for a post
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostResponseDto {
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

impl From<PostWithAuthor> for PostResponseDto {
    fn from(post: PostWithAuthor) -> Self {
        Self {
            id: post.id,
            title: post.title,
            content: post.content,
            author_id: post.author_id,
            author_username: post.author_username,
            views: post.views,
            comment_count: post.comment_count,
            date_posted: post.date_posted,
            updated_at: post.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_post_dto_rejects_long_title() {
        let dto = CreatePostDto {
            title: "x".repeat(101),
            content: "body".to_string(),
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_create_post_dto_rejects_empty_content() {
        let dto = CreatePostDto {
            title: "a title".to_string(),
            content: String::new(),
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_update_post_dto_allows_partial() {
        let dto = UpdatePostDto {
            title: Some("new title".to_string()),
            content: None,
        };
        assert!(dto.validate().is_ok());
    }
}
