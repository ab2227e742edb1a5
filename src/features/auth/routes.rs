use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::auth::handlers::auth_handler;
use crate::features::auth::services::AuthService;

/// Public auth routes: signup, activation, login
pub fn public_routes(service: Arc<AuthService>) -> Router {
    Router::new()
        .route("/api/auth/signup", post(auth_handler::signup))
        .route("/api/auth/activate", post(auth_handler::activate))
        .route("/api/auth/login", post(auth_handler::login))
        .with_state(service)
}

/// Protected auth routes: current-user lookup
pub fn protected_routes(service: Arc<AuthService>) -> Router {
    Router::new()
        .route("/api/auth/me", get(auth_handler::get_me))
        .with_state(service)
}
