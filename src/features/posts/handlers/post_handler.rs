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
use crate::features::posts::dtos::{CreatePostDto, PostResponseDto, UpdatePostDto};
use crate::features::posts::services::PostService;
use crate::shared::types::{ApiResponse, Meta, PaginationQuery};

/// List posts, newest first
#[utoipa::path(
    get,
    path = "/api/posts",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Page of posts", body = ApiResponse<Vec<PostResponseDto>>),
    ),
    tag = "posts"
)]
pub async fn list_posts(
    State(service): State<Arc<PostService>>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<PostResponseDto>>>> {
    let (posts, total) = service.list(&pagination).await?;
    Ok(Json(ApiResponse::success(
        Some(posts),
        None,
        Some(Meta { total }),
    )))
}

/// List posts authored by a user, newest first
#[utoipa::path(
    get,
    path = "/api/users/{id}/posts",
    params(
        ("id" = Uuid, Path, description = "User ID"),
        PaginationQuery
    ),
    responses(
        (status = 200, description = "Page of the user's posts", body = ApiResponse<Vec<PostResponseDto>>),
    ),
    tag = "posts"
)]
pub async fn list_user_posts(
    State(service): State<Arc<PostService>>,
    Path(id): Path<Uuid>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<PostResponseDto>>>> {
    let (posts, total) = service.list_by_author(id, &pagination).await?;
    Ok(Json(ApiResponse::success(
        Some(posts),
        None,
        Some(Meta { total }),
    )))
}

/// Get a post by ID
///
/// Reading a post counts as a view.
#[utoipa::path(
    get,
    path = "/api/posts/{id}",
    params(
        ("id" = Uuid, Path, description = "Post ID")
    ),
    responses(
        (status = 200, description = "Post found", body = ApiResponse<PostResponseDto>),
        (status = 404, description = "Post not found")
    ),
    tag = "posts"
)]
pub async fn get_post(
    State(service): State<Arc<PostService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<PostResponseDto>>> {
    let post = service.get_and_register_view(id).await?;
    Ok(Json(ApiResponse::success(Some(post), None, None)))
}

/// Create a post
#[utoipa::path(
    post,
    path = "/api/posts",
    request_body = CreatePostDto,
    responses(
        (status = 201, description = "Post created", body = ApiResponse<PostResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Authentication required")
    ),
    security(("bearer_auth" = [])),
    tag = "posts"
)]
pub async fn create_post(
    user: AuthenticatedUser,
    State(service): State<Arc<PostService>>,
    AppJson(dto): AppJson<CreatePostDto>,
) -> Result<(StatusCode, Json<ApiResponse<PostResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let post = service.create(&user, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(post), None, None)),
    ))
}

/// Update a post (author only)
#[utoipa::path(
    put,
    path = "/api/posts/{id}",
    params(
        ("id" = Uuid, Path, description = "Post ID")
    ),
    request_body = UpdatePostDto,
    responses(
        (status = 200, description = "Post updated", body = ApiResponse<PostResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Post not found")
    ),
    security(("bearer_auth" = [])),
    tag = "posts"
)]
pub async fn update_post(
    user: AuthenticatedUser,
    State(service): State<Arc<PostService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdatePostDto>,
) -> Result<Json<ApiResponse<PostResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let post = service.update(id, &user, dto).await?;
    Ok(Json(ApiResponse::success(Some(post), None, None)))
}

/// Delete a post and its comments (author only)
#[utoipa::path(
    delete,
    path = "/api/posts/{id}",
    params(
        ("id" = Uuid, Path, description = "Post ID")
    ),
    responses(
        (status = 200, description = "Post deleted"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Post not found")
    ),
    security(("bearer_auth" = [])),
    tag = "posts"
)]
pub async fn delete_post(
    user: AuthenticatedUser,
    State(service): State<Arc<PostService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(id, &user).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Post deleted".to_string()),
        None,
    )))
}
