use std::collections::{HashMap, HashSet};

use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::comments::dtos::{CommentResponseDto, CommentTreeDto, CreateCommentDto};
use crate::features::comments::models::CommentWithAuthor;
use crate::shared::types::PaginationQuery;

const COMMENT_SELECT: &str = r#"
    SELECT
        c.id, c.post_id, c.author_id,
        u.username AS author_username,
        c.parent_id, c.content, c.date_posted
    FROM comments c
    JOIN users u ON u.id = c.author_id
"#;

/// Service for comment operations
pub struct CommentService {
    pool: PgPool,
}

impl CommentService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get the full comment thread of a post as a nested tree.
    ///
    /// Top-level comments come in posting order; replies are nested under
    /// their parent, recursively.
    pub async fn list_thread(&self, post_id: Uuid) -> Result<Vec<CommentTreeDto>> {
        self.ensure_post_exists(post_id).await?;

        let comments = sqlx::query_as::<_, CommentWithAuthor>(&format!(
            "{} WHERE c.post_id = $1 ORDER BY c.date_posted ASC",
            COMMENT_SELECT
        ))
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list comments: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(build_comment_tree(comments))
    }

    /// List comments written by the given user, newest first.
    pub async fn list_by_author(
        &self,
        author_id: Uuid,
        pagination: &PaginationQuery,
    ) -> Result<(Vec<CommentResponseDto>, i64)> {
        let comments = sqlx::query_as::<_, CommentWithAuthor>(&format!(
            "{} WHERE c.author_id = $1 ORDER BY c.date_posted DESC LIMIT $2 OFFSET $3",
            COMMENT_SELECT
        ))
        .bind(author_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list comments by author: {:?}", e);
            AppError::Database(e)
        })?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE author_id = $1")
            .bind(author_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count comments by author: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((comments.into_iter().map(|c| c.into()).collect(), total))
    }

    /// Add a comment to a post, optionally as a reply to another comment.
    ///
    /// A reply's parent must be a comment on the same post.
    pub async fn create(
        &self,
        post_id: Uuid,
        author: &AuthenticatedUser,
        dto: CreateCommentDto,
    ) -> Result<CommentResponseDto> {
        self.ensure_post_exists(post_id).await?;

        if let Some(parent_id) = dto.parent_id {
            let parent_post: Option<Uuid> =
                sqlx::query_scalar("SELECT post_id FROM comments WHERE id = $1")
                    .bind(parent_id)
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(|e| {
                        tracing::error!("Failed to look up parent comment: {:?}", e);
                        AppError::Database(e)
                    })?;

            match parent_post {
                Some(pid) if pid == post_id => {}
                Some(_) => {
                    return Err(AppError::BadRequest(
                        "Parent comment belongs to a different post".to_string(),
                    ))
                }
                None => {
                    return Err(AppError::BadRequest(
                        "Parent comment not found".to_string(),
                    ))
                }
            }
        }

        let comment = sqlx::query_as::<_, CommentWithAuthor>(
            r#"
            WITH created AS (
                INSERT INTO comments (post_id, author_id, parent_id, content)
                VALUES ($1, $2, $3, $4)
                RETURNING id, post_id, author_id, parent_id, content, date_posted
            )
            SELECT
                c.id, c.post_id, c.author_id,
                u.username AS author_username,
                c.parent_id, c.content, c.date_posted
            FROM created c
            JOIN users u ON u.id = c.author_id
            "#,
        )
        .bind(post_id)
        .bind(author.id)
        .bind(dto.parent_id)
        .bind(&dto.content)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create comment: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::info!(
            "Comment created: id={}, post={}, author={}",
            comment.id,
            post_id,
            author.id
        );

        Ok(comment.into())
    }

    /// Delete a comment and, through the FK cascade, its whole reply subtree.
    /// Only the author or a superuser may delete it.
    pub async fn delete(&self, id: Uuid, actor: &AuthenticatedUser) -> Result<()> {
        let author_id: Option<Uuid> =
            sqlx::query_scalar("SELECT author_id FROM comments WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to look up comment author: {:?}", e);
                    AppError::Database(e)
                })?;

        let author_id =
            author_id.ok_or_else(|| AppError::NotFound(format!("Comment '{}' not found", id)))?;

        if !actor.can_manage(author_id) {
            return Err(AppError::Forbidden(
                "Only the author may delete this comment".to_string(),
            ));
        }

        sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete comment: {:?}", e);
                AppError::Database(e)
            })?;

        tracing::info!("Comment deleted: id={}, actor={}", id, actor.id);
        Ok(())
    }

    async fn ensure_post_exists(&self, post_id: Uuid) -> Result<()> {
        let exists: Option<Uuid> = sqlx::query_scalar("SELECT id FROM posts WHERE id = $1")
            .bind(post_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to look up post: {:?}", e);
                AppError::Database(e)
            })?;

        exists
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Post '{}' not found", post_id)))
    }
}

/// Assemble flat, chronologically ordered comment rows into a nested tree.
///
/// Rows whose parent is missing from the set (should not happen with the FK
/// in place) are kept as top-level comments rather than dropped.
fn build_comment_tree(rows: Vec<CommentWithAuthor>) -> Vec<CommentTreeDto> {
    let ids: HashSet<Uuid> = rows.iter().map(|r| r.id).collect();

    let mut roots: Vec<CommentWithAuthor> = Vec::new();
    let mut children: HashMap<Uuid, Vec<CommentWithAuthor>> = HashMap::new();

    for row in rows {
        match row.parent_id {
            Some(parent_id) if ids.contains(&parent_id) => {
                children.entry(parent_id).or_default().push(row)
            }
            _ => roots.push(row),
        }
    }

    fn attach(
        row: CommentWithAuthor,
        children: &mut HashMap<Uuid, Vec<CommentWithAuthor>>,
    ) -> CommentTreeDto {
        let kids = children.remove(&row.id).unwrap_or_default();
        let mut node = CommentTreeDto::from(row);
        node.replies = kids.into_iter().map(|k| attach(k, children)).collect();
        node
    }

    roots
        .into_iter()
        .map(|r| attach(r, &mut children))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn comment(
        id: Uuid,
        parent_id: Option<Uuid>,
        content: &str,
        offset_secs: i64,
    ) -> CommentWithAuthor {
        CommentWithAuthor {
            id,
            post_id: Uuid::nil(),
            author_id: Uuid::nil(),
            author_username: "poster".to_string(),
            parent_id,
            content: content.to_string(),
            date_posted: Utc::now() + Duration::seconds(offset_secs),
        }
    }

    #[test]
    fn test_build_tree_nests_replies() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let reply_to_a = Uuid::new_v4();
        let nested_reply = Uuid::new_v4();

        let rows = vec![
            comment(a, None, "first", 0),
            comment(b, None, "second", 1),
            comment(reply_to_a, Some(a), "reply", 2),
            comment(nested_reply, Some(reply_to_a), "deep reply", 3),
        ];

        let tree = build_comment_tree(rows);

        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].content, "first");
        assert_eq!(tree[1].content, "second");
        assert_eq!(tree[0].replies.len(), 1);
        assert_eq!(tree[0].replies[0].content, "reply");
        assert_eq!(tree[0].replies[0].replies.len(), 1);
        assert_eq!(tree[0].replies[0].replies[0].content, "deep reply");
        assert!(tree[1].replies.is_empty());
    }

    #[test]
    fn test_build_tree_keeps_chronological_order() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let r1 = Uuid::new_v4();
        let r2 = Uuid::new_v4();

        let rows = vec![
            comment(a, None, "first", 0),
            comment(b, None, "second", 1),
            comment(r1, Some(a), "older reply", 2),
            comment(r2, Some(a), "newer reply", 3),
        ];

        let tree = build_comment_tree(rows);
        let replies: Vec<&str> = tree[0]
            .replies
            .iter()
            .map(|r| r.content.as_str())
            .collect();
        assert_eq!(replies, vec!["older reply", "newer reply"]);
    }

    #[test]
    fn test_build_tree_orphan_becomes_root() {
        let orphan = comment(Uuid::new_v4(), Some(Uuid::new_v4()), "orphan", 0);
        let tree = build_comment_tree(vec![orphan]);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].content, "orphan");
    }

    #[test]
    fn test_build_tree_empty() {
        assert!(build_comment_tree(Vec::new()).is_empty());
    }
}
