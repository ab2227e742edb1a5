use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::features::comments::handlers::comment_handler;
use crate::features::comments::services::CommentService;

/// Public comment routes: reading threads
pub fn public_routes(service: Arc<CommentService>) -> Router {
    Router::new()
        .route(
            "/api/posts/{id}/comments",
            get(comment_handler::list_thread),
        )
        .route(
            "/api/users/{id}/comments",
            get(comment_handler::list_user_comments),
        )
        .with_state(service)
}

/// Protected comment routes: writing
pub fn protected_routes(service: Arc<CommentService>) -> Router {
    Router::new()
        .route(
            "/api/posts/{id}/comments",
            post(comment_handler::create_comment),
        )
        .route(
            "/api/comments/{id}",
            delete(comment_handler::delete_comment),
        )
        .with_state(service)
}
