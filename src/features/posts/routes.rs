use std::sync::Arc;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::features::posts::handlers::post_handler;
use crate::features::posts::services::PostService;

/// Public post routes: browsing
pub fn public_routes(service: Arc<PostService>) -> Router {
    Router::new()
        .route("/api/posts", get(post_handler::list_posts))
        .route("/api/posts/{id}", get(post_handler::get_post))
        .route("/api/users/{id}/posts", get(post_handler::list_user_posts))
        .with_state(service)
}

/// Protected post routes: authoring
pub fn protected_routes(service: Arc<PostService>) -> Router {
    Router::new()
        .route("/api/posts", post(post_handler::create_post))
        .route("/api/posts/{id}", put(post_handler::update_post))
        .route("/api/posts/{id}", delete(post_handler::delete_post))
        .with_state(service)
}
