use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::posts::dtos::{CreatePostDto, PostResponseDto, UpdatePostDto};
use crate::features::posts::models::PostWithAuthor;
use crate::shared::types::PaginationQuery;

const POST_SELECT: &str = r#"
    SELECT
        p.id, p.title, p.content, p.author_id,
        u.username AS author_username,
        p.views,
        (SELECT COUNT(*) FROM comments c WHERE c.post_id = p.id) AS comment_count,
        p.date_posted, p.updated_at
    FROM posts p
    JOIN users u ON u.id = p.author_id
"#;

/// Service for post operations
pub struct PostService {
    pool: PgPool,
}

impl PostService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List posts, newest first.
    ///
    /// Returns the page of posts and the total number of posts.
    pub async fn list(&self, pagination: &PaginationQuery) -> Result<(Vec<PostResponseDto>, i64)> {
        let posts = sqlx::query_as::<_, PostWithAuthor>(&format!(
            "{} ORDER BY p.date_posted DESC LIMIT $1 OFFSET $2",
            POST_SELECT
        ))
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list posts: {:?}", e);
            AppError::Database(e)
        })?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count posts: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((posts.into_iter().map(|p| p.into()).collect(), total))
    }

    /// List posts authored by the given user, newest first.
    pub async fn list_by_author(
        &self,
        author_id: Uuid,
        pagination: &PaginationQuery,
    ) -> Result<(Vec<PostResponseDto>, i64)> {
        let posts = sqlx::query_as::<_, PostWithAuthor>(&format!(
            "{} WHERE p.author_id = $1 ORDER BY p.date_posted DESC LIMIT $2 OFFSET $3",
            POST_SELECT
        ))
        .bind(author_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list posts by author: {:?}", e);
            AppError::Database(e)
        })?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE author_id = $1")
            .bind(author_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count posts by author: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((posts.into_iter().map(|p| p.into()).collect(), total))
    }

    /// Get a post by ID and register the view.
    ///
    /// The view counter is incremented atomically in the same statement that
    /// reads the post, so concurrent readers never lose a count.
    pub async fn get_and_register_view(&self, id: Uuid) -> Result<PostResponseDto> {
        let post = sqlx::query_as::<_, PostWithAuthor>(
            r#"
            WITH bumped AS (
                UPDATE posts
                SET views = views + 1
                WHERE id = $1
                RETURNING id, title, content, author_id, views, date_posted, updated_at
            )
            SELECT
                b.id, b.title, b.content, b.author_id,
                u.username AS author_username,
                b.views,
                (SELECT COUNT(*) FROM comments c WHERE c.post_id = b.id) AS comment_count,
                b.date_posted, b.updated_at
            FROM bumped b
            JOIN users u ON u.id = b.author_id
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get post: {:?}", e);
            AppError::Database(e)
        })?;

        post.map(|p| p.into())
            .ok_or_else(|| AppError::NotFound(format!("Post '{}' not found", id)))
    }

    /// Create a post authored by the given user.
    pub async fn create(
        &self,
        author: &AuthenticatedUser,
        dto: CreatePostDto,
    ) -> Result<PostResponseDto> {
        let post = sqlx::query_as::<_, PostWithAuthor>(
            r#"
            WITH created AS (
                INSERT INTO posts (title, content, author_id)
                VALUES ($1, $2, $3)
                RETURNING id, title, content, author_id, views, date_posted, updated_at
            )
            SELECT
                c.id, c.title, c.content, c.author_id,
                u.username AS author_username,
                c.views,
                0::BIGINT AS comment_count,
                c.date_posted, c.updated_at
            FROM created c
            JOIN users u ON u.id = c.author_id
            "#,
        )
        .bind(&dto.title)
        .bind(&dto.content)
        .bind(author.id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create post: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::info!("Post created: id={}, author={}", post.id, author.id);

        Ok(post.into())
    }

    /// Update a post. Only the author or a superuser may edit it.
    pub async fn update(
        &self,
        id: Uuid,
        actor: &AuthenticatedUser,
        dto: UpdatePostDto,
    ) -> Result<PostResponseDto> {
        self.check_ownership(id, actor).await?;

        let post = sqlx::query_as::<_, PostWithAuthor>(
            r#"
            WITH updated AS (
                UPDATE posts
                SET title = COALESCE($2, title),
                    content = COALESCE($3, content),
                    updated_at = now()
                WHERE id = $1
                RETURNING id, title, content, author_id, views, date_posted, updated_at
            )
            SELECT
                up.id, up.title, up.content, up.author_id,
                u.username AS author_username,
                up.views,
                (SELECT COUNT(*) FROM comments c WHERE c.post_id = up.id) AS comment_count,
                up.date_posted, up.updated_at
            FROM updated up
            JOIN users u ON u.id = up.author_id
            "#,
        )
        .bind(id)
        .bind(&dto.title)
        .bind(&dto.content)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update post: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(post.into())
    }

    /// Delete a post and its whole comment thread (FK cascade).
    /// Only the author or a superuser may delete it.
    pub async fn delete(&self, id: Uuid, actor: &AuthenticatedUser) -> Result<()> {
        self.check_ownership(id, actor).await?;

        sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete post: {:?}", e);
                AppError::Database(e)
            })?;

        tracing::info!("Post deleted: id={}, actor={}", id, actor.id);
        Ok(())
    }

    async fn check_ownership(&self, id: Uuid, actor: &AuthenticatedUser) -> Result<()> {
        let author_id: Option<Uuid> = sqlx::query_scalar("SELECT author_id FROM posts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to look up post author: {:?}", e);
                AppError::Database(e)
            })?;

        let author_id =
            author_id.ok_or_else(|| AppError::NotFound(format!("Post '{}' not found", id)))?;

        if !actor.can_manage(author_id) {
            return Err(AppError::Forbidden(
                "Only the author may modify this post".to_string(),
            ));
        }

        Ok(())
    }
}
