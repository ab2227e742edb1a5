use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::accounts::{dtos as accounts_dtos, handlers::profile_handler};
use crate::features::auth::{self, handlers::auth_handler};
use crate::features::comments::{dtos as comments_dtos, handlers::comment_handler};
use crate::features::posts::{dtos as posts_dtos, handlers::post_handler};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth_handler::signup,
        auth_handler::activate,
        auth_handler::login,
        auth_handler::get_me,
        // Accounts
        profile_handler::get_user,
        profile_handler::update_user,
        profile_handler::request_email_change,
        profile_handler::confirm_email_change,
        profile_handler::change_password,
        profile_handler::request_password_reset,
        profile_handler::confirm_password_reset,
        // Posts
        post_handler::list_posts,
        post_handler::list_user_posts,
        post_handler::get_post,
        post_handler::create_post,
        post_handler::update_post,
        post_handler::delete_post,
        // Comments
        comment_handler::list_thread,
        comment_handler::list_user_comments,
        comment_handler::create_comment,
        comment_handler::delete_comment,
    ),
    components(
        schemas(
            // Shared
            Meta,
            // Auth
            auth::model::AuthenticatedUser,
            auth::dtos::SignupRequestDto,
            auth::dtos::ActivateRequestDto,
            auth::dtos::LoginRequestDto,
            auth::dtos::AuthResponseDto,
            ApiResponse<auth::dtos::AuthResponseDto>,
            // Accounts
            accounts_dtos::UserResponseDto,
            accounts_dtos::UpdateProfileDto,
            accounts_dtos::EmailChangeRequestDto,
            accounts_dtos::ConfirmTokenDto,
            accounts_dtos::PasswordChangeRequestDto,
            accounts_dtos::PasswordResetRequestDto,
            accounts_dtos::PasswordResetConfirmDto,
            ApiResponse<accounts_dtos::UserResponseDto>,
            // Posts
            posts_dtos::CreatePostDto,
            posts_dtos::UpdatePostDto,
            posts_dtos::PostResponseDto,
            ApiResponse<posts_dtos::PostResponseDto>,
            ApiResponse<Vec<posts_dtos::PostResponseDto>>,
            // Comments
            comments_dtos::CreateCommentDto,
            comments_dtos::CommentResponseDto,
            comments_dtos::CommentTreeDto,
            ApiResponse<comments_dtos::CommentResponseDto>,
            ApiResponse<Vec<comments_dtos::CommentResponseDto>>,
            ApiResponse<Vec<comments_dtos::CommentTreeDto>>,
        )
    ),
    tags(
        (name = "auth", description = "Signup, activation, and login"),
        (name = "users", description = "Public profiles and profile editing"),
        (name = "account", description = "Email and password management"),
        (name = "posts", description = "Discussion posts"),
        (name = "comments", description = "Threaded comments under posts"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Agora API",
        version = "0.1.0",
        description = "API documentation for Agora",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
