use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::comments::dtos::{CommentResponseDto, CommentTreeDto, CreateCommentDto};
use crate::features::comments::services::CommentService;
use crate::shared::types::{ApiResponse, Meta, PaginationQuery};

/// Get a post's comment thread as a nested tree
#[utoipa::path(
    get,
    path = "/api/posts/{id}/comments",
    params(
        ("id" = Uuid, Path, description = "Post ID")
    ),
    responses(
        (status = 200, description = "Comment thread", body = ApiResponse<Vec<CommentTreeDto>>),
        (status = 404, description = "Post not found")
    ),
    tag = "comments"
)]
pub async fn list_thread(
    State(service): State<Arc<CommentService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<CommentTreeDto>>>> {
    let thread = service.list_thread(id).await?;
    Ok(Json(ApiResponse::success(Some(thread), None, None)))
}

/// List comments written by a user, newest first
#[utoipa::path(
    get,
    path = "/api/users/{id}/comments",
    params(
        ("id" = Uuid, Path, description = "User ID"),
        PaginationQuery
    ),
    responses(
        (status = 200, description = "Page of the user's comments", body = ApiResponse<Vec<CommentResponseDto>>),
    ),
    tag = "comments"
)]
pub async fn list_user_comments(
    State(service): State<Arc<CommentService>>,
    Path(id): Path<Uuid>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<CommentResponseDto>>>> {
    let (comments, total) = service.list_by_author(id, &pagination).await?;
    Ok(Json(ApiResponse::success(
        Some(comments),
        None,
        Some(Meta { total }),
    )))
}

/// Comment on a post, optionally replying to another comment
#[utoipa::path(
    post,
    path = "/api/posts/{id}/comments",
    params(
        ("id" = Uuid, Path, description = "Post ID")
    ),
    request_body = CreateCommentDto,
    responses(
        (status = 201, description = "Comment created", body = ApiResponse<CommentResponseDto>),
        (status = 400, description = "Validation error or parent on a different post"),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "Post not found")
    ),
    security(("bearer_auth" = [])),
    tag = "comments"
)]
pub async fn create_comment(
    user: AuthenticatedUser,
    State(service): State<Arc<CommentService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<CreateCommentDto>,
) -> Result<(StatusCode, Json<ApiResponse<CommentResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let comment = service.create(id, &user, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(comment), None, None)),
    ))
}

/// Delete a comment and its replies (author only)
#[utoipa::path(
    delete,
    path = "/api/comments/{id}",
    params(
        ("id" = Uuid, Path, description = "Comment ID")
    ),
    responses(
        (status = 200, description = "Comment deleted"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Comment not found")
    ),
    security(("bearer_auth" = [])),
    tag = "comments"
)]
pub async fn delete_comment(
    user: AuthenticatedUser,
    State(service): State<Arc<CommentService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(id, &user).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Comment deleted".to_string()),
        None,
    )))
}
