use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::features::accounts::handlers::profile_handler;
use crate::features::accounts::services::UserService;

/// Public account routes: profile lookup and password reset
pub fn public_routes(service: Arc<UserService>) -> Router {
    Router::new()
        .route("/api/users/{id}", get(profile_handler::get_user))
        .route(
            "/api/account/password-reset",
            post(profile_handler::request_password_reset),
        )
        .route(
            "/api/account/password-reset/confirm",
            post(profile_handler::confirm_password_reset),
        )
        .with_state(service)
}

/// Protected account routes: profile editing and email/password changes
pub fn protected_routes(service: Arc<UserService>) -> Router {
    Router::new()
        .route("/api/users/{id}", put(profile_handler::update_user))
        .route(
            "/api/account/email-change",
            post(profile_handler::request_email_change),
        )
        .route(
            "/api/account/email-change/confirm",
            post(profile_handler::confirm_email_change),
        )
        .route(
            "/api/account/password-change",
            post(profile_handler::change_password),
        )
        .with_state(service)
}
