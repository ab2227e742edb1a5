use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::accounts::dtos::{
    ConfirmTokenDto, EmailChangeRequestDto, PasswordChangeRequestDto, PasswordResetConfirmDto,
    PasswordResetRequestDto, UpdateProfileDto, UserResponseDto,
};
use crate::features::accounts::services::{AvatarUpload, UserService};
use crate::features::auth::model::AuthenticatedUser;
use crate::shared::constants::{ALLOWED_AVATAR_MIME_TYPES, MAX_AVATAR_SIZE};
use crate::shared::types::ApiResponse;

/// Get a user's public profile
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User found", body = ApiResponse<UserResponseDto>),
        (status = 404, description = "User not found")
    ),
    tag = "users"
)]
pub async fn get_user(
    State(service): State<Arc<UserService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<UserResponseDto>>> {
    let user = service.get_user(id).await?;
    Ok(Json(ApiResponse::success(Some(user), None, None)))
}

/// Update a user's profile
///
/// Accepts multipart/form-data with optional fields:
/// - `username`, `first_name`, `last_name`, `profile`: text fields
/// - `avatar`: replacement profile image (jpeg/png/gif/webp, max 5 MiB)
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    request_body(
        content = UpdateProfileDto,
        content_type = "multipart/form-data",
        description = "Profile form with optional text fields and avatar image",
    ),
    responses(
        (status = 200, description = "Profile updated", body = ApiResponse<UserResponseDto>),
        (status = 400, description = "Validation error or unsupported image"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Not the profile owner"),
        (status = 409, description = "Username already taken")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn update_user(
    user: AuthenticatedUser,
    State(service): State<Arc<UserService>>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<UserResponseDto>>> {
    let mut dto = UpdateProfileDto::default();
    let mut avatar: Option<AvatarUpload> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "username" => {
                dto.username = Some(read_text_field(field, "username").await?);
            }
            "first_name" => {
                dto.first_name = Some(read_text_field(field, "first_name").await?);
            }
            "last_name" => {
                dto.last_name = Some(read_text_field(field, "last_name").await?);
            }
            "profile" => {
                dto.profile_bio = Some(read_text_field(field, "profile").await?);
            }
            "avatar" => {
                let content_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".to_string());

                if !ALLOWED_AVATAR_MIME_TYPES.contains(&content_type.as_str()) {
                    return Err(AppError::BadRequest(format!(
                        "Unsupported avatar content type: {}",
                        content_type
                    )));
                }

                let data = field.bytes().await.map_err(|e| {
                    debug!("Failed to read avatar bytes: {}", e);
                    AppError::BadRequest(format!("Failed to read avatar data: {}", e))
                })?;

                if data.len() > MAX_AVATAR_SIZE {
                    return Err(AppError::BadRequest(format!(
                        "Avatar must not exceed {} bytes",
                        MAX_AVATAR_SIZE
                    )));
                }

                avatar = Some(AvatarUpload {
                    data: data.to_vec(),
                    content_type,
                });
            }
            _ => {
                // Ignore unknown fields
                debug!("Ignoring unknown field: {}", field_name);
            }
        }
    }

    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let updated = service.update_profile(id, &user, dto, avatar).await?;
    Ok(Json(ApiResponse::success(Some(updated), None, None)))
}

async fn read_text_field(field: axum::extract::multipart::Field<'_>, name: &str) -> Result<String> {
    field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read {} field: {}", name, e)))
}

/// Request an email change (sends a confirmation mail to the new address)
#[utoipa::path(
    post,
    path = "/api/account/email-change",
    request_body = EmailChangeRequestDto,
    responses(
        (status = 202, description = "Confirmation mail sent to the new address"),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Authentication required"),
        (status = 502, description = "Confirmation mail could not be sent")
    ),
    security(("bearer_auth" = [])),
    tag = "account"
)]
pub async fn request_email_change(
    user: AuthenticatedUser,
    State(service): State<Arc<UserService>>,
    AppJson(dto): AppJson<EmailChangeRequestDto>,
) -> Result<(StatusCode, Json<ApiResponse<()>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    service.request_email_change(&user, &dto.email).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(ApiResponse::success(
            None,
            Some("Confirmation mail sent".to_string()),
            None,
        )),
    ))
}

/// Confirm an email change using the mailed token
#[utoipa::path(
    post,
    path = "/api/account/email-change/confirm",
    request_body = ConfirmTokenDto,
    responses(
        (status = 200, description = "Email address updated", body = ApiResponse<UserResponseDto>),
        (status = 400, description = "Invalid or expired token"),
        (status = 401, description = "Authentication required"),
        (status = 409, description = "Email already in use")
    ),
    security(("bearer_auth" = [])),
    tag = "account"
)]
pub async fn confirm_email_change(
    user: AuthenticatedUser,
    State(service): State<Arc<UserService>>,
    AppJson(dto): AppJson<ConfirmTokenDto>,
) -> Result<Json<ApiResponse<UserResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let updated = service.confirm_email_change(&user, &dto.token).await?;
    Ok(Json(ApiResponse::success(Some(updated), None, None)))
}

/// Change the password of the logged-in user
#[utoipa::path(
    post,
    path = "/api/account/password-change",
    request_body = PasswordChangeRequestDto,
    responses(
        (status = 200, description = "Password changed"),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Current password incorrect")
    ),
    security(("bearer_auth" = [])),
    tag = "account"
)]
pub async fn change_password(
    user: AuthenticatedUser,
    State(service): State<Arc<UserService>>,
    AppJson(dto): AppJson<PasswordChangeRequestDto>,
) -> Result<Json<ApiResponse<()>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    service
        .change_password(user.id, &dto.current_password, &dto.new_password)
        .await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Password changed".to_string()),
        None,
    )))
}

/// Request a password reset mail
///
/// Responds 202 regardless of whether the address has an account.
#[utoipa::path(
    post,
    path = "/api/account/password-reset",
    request_body = PasswordResetRequestDto,
    responses(
        (status = 202, description = "Reset mail sent if the address has an account"),
        (status = 400, description = "Validation error")
    ),
    tag = "account"
)]
pub async fn request_password_reset(
    State(service): State<Arc<UserService>>,
    AppJson(dto): AppJson<PasswordResetRequestDto>,
) -> Result<(StatusCode, Json<ApiResponse<()>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    service.request_password_reset(&dto.email).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(ApiResponse::success(
            None,
            Some("If the address has an account, a reset mail was sent".to_string()),
            None,
        )),
    ))
}

/// Complete a password reset using the mailed token
#[utoipa::path(
    post,
    path = "/api/account/password-reset/confirm",
    request_body = PasswordResetConfirmDto,
    responses(
        (status = 200, description = "Password reset"),
        (status = 400, description = "Invalid, expired, or already used token")
    ),
    tag = "account"
)]
pub async fn confirm_password_reset(
    State(service): State<Arc<UserService>>,
    AppJson(dto): AppJson<PasswordResetConfirmDto>,
) -> Result<Json<ApiResponse<()>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    service
        .confirm_password_reset(&dto.token, &dto.new_password)
        .await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Password reset".to_string()),
        None,
    )))
}
