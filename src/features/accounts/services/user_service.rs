use minijinja::Value;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::accounts::dtos::{get_avatar_extension, UpdateProfileDto, UserResponseDto};
use crate::features::accounts::models::User;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::services::{password, TokenPurpose, TokenService};
use crate::modules::mail::Mailer;
use crate::modules::storage::MinIOClient;

/// An uploaded avatar image from the profile form
pub struct AvatarUpload {
    pub data: Vec<u8>,
    pub content_type: String,
}

/// Service for profile management and account email/password flows
pub struct UserService {
    pool: PgPool,
    storage: Arc<MinIOClient>,
    tokens: Arc<TokenService>,
    mailer: Arc<Mailer>,
    frontend_url: String,
}

impl UserService {
    pub fn new(
        pool: PgPool,
        storage: Arc<MinIOClient>,
        tokens: Arc<TokenService>,
        mailer: Arc<Mailer>,
        frontend_url: String,
    ) -> Self {
        Self {
            pool,
            storage,
            tokens,
            mailer,
            frontend_url: frontend_url.trim_end_matches('/').to_string(),
        }
    }

    /// Get a user's public profile
    pub async fn get_user(&self, id: Uuid) -> Result<UserResponseDto> {
        let user = self.find_by_id(id).await?;
        user.map(|u| u.into())
            .ok_or_else(|| AppError::NotFound(format!("User '{}' not found", id)))
    }

    /// Update profile fields and optionally replace the avatar image.
    ///
    /// Only the account owner or a superuser may update a profile. When the
    /// avatar is replaced, the previous image is removed from object storage
    /// so it does not keep occupying space; a failed removal is only logged.
    pub async fn update_profile(
        &self,
        target_id: Uuid,
        actor: &AuthenticatedUser,
        dto: UpdateProfileDto,
        avatar: Option<AvatarUpload>,
    ) -> Result<UserResponseDto> {
        if !actor.can_manage(target_id) {
            return Err(AppError::Forbidden(
                "You may only edit your own profile".to_string(),
            ));
        }

        let current = self
            .find_by_id(target_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User '{}' not found", target_id)))?;

        // Upload the replacement avatar before touching the row, so a failed
        // upload leaves the profile unchanged
        let (avatar_key, avatar_url) = match avatar {
            Some(upload) => {
                let extension = get_avatar_extension(&upload.content_type).ok_or_else(|| {
                    AppError::BadRequest(format!(
                        "Unsupported avatar content type: {}",
                        upload.content_type
                    ))
                })?;
                let key = self.storage.generate_avatar_key(target_id, extension);
                self.storage
                    .upload(&key, upload.data, &upload.content_type)
                    .await?;
                let url = self.storage.get_public_url(&key);
                (Some(key), Some(url))
            }
            None => (current.avatar_key.clone(), current.avatar_url.clone()),
        };

        let username = dto.username.unwrap_or_else(|| current.username.clone());
        let first_name = dto.first_name.unwrap_or_else(|| current.first_name.clone());
        let last_name = dto.last_name.unwrap_or_else(|| current.last_name.clone());
        let profile_bio = dto
            .profile_bio
            .unwrap_or_else(|| current.profile_bio.clone());

        let updated = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET username = $2, first_name = $3, last_name = $4, profile_bio = $5,
                avatar_key = $6, avatar_url = $7, updated_at = now()
            WHERE id = $1
            RETURNING
                id, username, email, password_hash, first_name, last_name,
                profile_bio, avatar_key, avatar_url, is_active, is_superuser,
                date_joined, updated_at
            "#,
        )
        .bind(target_id)
        .bind(&username)
        .bind(&first_name)
        .bind(&last_name)
        .bind(&profile_bio)
        .bind(&avatar_key)
        .bind(&avatar_url)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
                AppError::Conflict("Username is already taken".to_string())
            }
            _ => {
                tracing::error!("Failed to update profile: {:?}", e);
                AppError::Database(e)
            }
        })?;

        // Remove the replaced avatar only after the row points at the new one
        if let (Some(old_key), true) = (&current.avatar_key, avatar_key != current.avatar_key) {
            if let Err(e) = self.storage.delete(old_key).await {
                tracing::warn!("Failed to delete replaced avatar '{}': {}", old_key, e);
            }
        }

        tracing::info!("Profile updated: id={}, username={}", updated.id, updated.username);

        Ok(updated.into())
    }

    /// Mail a signed confirmation link to a new email address.
    pub async fn request_email_change(
        &self,
        user: &AuthenticatedUser,
        new_email: &str,
    ) -> Result<()> {
        let token = self.tokens.issue_action_token(
            user.id,
            TokenPurpose::EmailChange,
            Some(new_email.to_string()),
            None,
        )?;
        let link = format!(
            "{}/email-change/confirm?token={}",
            self.frontend_url,
            urlencoding::encode(&token)
        );

        let mut ctx: HashMap<&str, Value> = HashMap::new();
        ctx.insert("username", Value::from(user.username.clone()));
        ctx.insert("link", Value::from(link));

        // The confirmation goes to the address being claimed
        self.mailer
            .send_templated(new_email, "email_change", &ctx)
            .await?;

        tracing::info!("Email change requested: user={}", user.id);
        Ok(())
    }

    /// Apply an email change from a mailed confirmation token.
    ///
    /// The token must belong to the calling user. Inactive accounts holding
    /// the new address are purged before the switch, the same cleanup that
    /// runs on signup.
    pub async fn confirm_email_change(
        &self,
        user: &AuthenticatedUser,
        token: &str,
    ) -> Result<UserResponseDto> {
        let claims = self
            .tokens
            .verify_action_token(token, TokenPurpose::EmailChange)?;

        if claims.user_id()? != user.id {
            return Err(AppError::BadRequest("Invalid token".to_string()));
        }

        let new_email = claims
            .email
            .ok_or_else(|| AppError::BadRequest("Invalid token".to_string()))?;

        sqlx::query("DELETE FROM users WHERE email = $1 AND is_active = FALSE")
            .bind(&new_email)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to purge inactive users: {:?}", e);
                AppError::Database(e)
            })?;

        let updated = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET email = $2, updated_at = now()
            WHERE id = $1
            RETURNING
                id, username, email, password_hash, first_name, last_name,
                profile_bio, avatar_key, avatar_url, is_active, is_superuser,
                date_joined, updated_at
            "#,
        )
        .bind(user.id)
        .bind(&new_email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
                AppError::Conflict("Email is already in use".to_string())
            }
            _ => {
                tracing::error!("Failed to change email: {:?}", e);
                AppError::Database(e)
            }
        })?;

        tracing::info!("Email changed: user={}", user.id);
        Ok(updated.into())
    }

    /// Change the password of a logged-in user after verifying the current one.
    pub async fn change_password(
        &self,
        user_id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> Result<()> {
        let user = self
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if !password::verify(current_password, &user.password_hash) {
            return Err(AppError::Unauthorized(
                "Current password is incorrect".to_string(),
            ));
        }

        let new_hash = password::hash(new_password)?;
        self.store_password_hash(user_id, &new_hash).await?;

        tracing::info!("Password changed: user={}", user_id);
        Ok(())
    }

    /// Start a password reset for the given address.
    ///
    /// Always succeeds from the caller's point of view; whether the address
    /// belongs to an active account is never revealed. The mailed token
    /// embeds a fingerprint of the current password hash so it can only be
    /// used once.
    pub async fn request_password_reset(&self, email: &str) -> Result<()> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT
                id, username, email, password_hash, first_name, last_name,
                profile_bio, avatar_key, avatar_url, is_active, is_superuser,
                date_joined, updated_at
            FROM users
            WHERE email = $1 AND is_active = TRUE
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to look up user by email: {:?}", e);
            AppError::Database(e)
        })?;

        let Some(user) = user else {
            tracing::debug!("Password reset requested for unknown address");
            return Ok(());
        };

        let fingerprint = TokenService::password_fingerprint(&user.password_hash);
        let token = self.tokens.issue_action_token(
            user.id,
            TokenPurpose::PasswordReset,
            None,
            Some(fingerprint),
        )?;
        let link = format!(
            "{}/password-reset/confirm?token={}",
            self.frontend_url,
            urlencoding::encode(&token)
        );

        let mut ctx: HashMap<&str, Value> = HashMap::new();
        ctx.insert("username", Value::from(user.username.clone()));
        ctx.insert("link", Value::from(link));

        if let Err(e) = self
            .mailer
            .send_templated(&user.email, "password_reset", &ctx)
            .await
        {
            // Swallow delivery failures; a different response here would
            // reveal which addresses have accounts
            tracing::warn!("Failed to send password reset mail: {}", e);
        }

        Ok(())
    }

    /// Complete a password reset from a mailed token.
    pub async fn confirm_password_reset(&self, token: &str, new_password: &str) -> Result<()> {
        let claims = self
            .tokens
            .verify_action_token(token, TokenPurpose::PasswordReset)?;
        let user_id = claims.user_id()?;

        let user = self
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::BadRequest("Invalid token".to_string()))?;

        let fingerprint = TokenService::password_fingerprint(&user.password_hash);
        if claims.pwd.as_deref() != Some(fingerprint.as_str()) {
            return Err(AppError::BadRequest(
                "Invalid or already used token".to_string(),
            ));
        }

        let new_hash = password::hash(new_password)?;
        self.store_password_hash(user_id, &new_hash).await?;

        tracing::info!("Password reset completed: user={}", user_id);
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT
                id, username, email, password_hash, first_name, last_name,
                profile_bio, avatar_key, avatar_url, is_active, is_superuser,
                date_joined, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to look up user by id: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn store_password_hash(&self, user_id: Uuid, hash: &str) -> Result<()> {
        sqlx::query("UPDATE users SET password_hash = $2, updated_at = now() WHERE id = $1")
            .bind(user_id)
            .bind(hash)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to store password hash: {:?}", e);
                AppError::Database(e)
            })?;
        Ok(())
    }
}
