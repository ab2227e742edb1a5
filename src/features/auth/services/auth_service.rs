use minijinja::Value;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::accounts::dtos::UserResponseDto;
use crate::features::accounts::models::User;
use crate::features::auth::dtos::{AuthResponseDto, LoginRequestDto, SignupRequestDto};
use crate::features::auth::services::{password, TokenPurpose, TokenService};
use crate::modules::mail::Mailer;

/// Service for signup, activation, and login
pub struct AuthService {
    pool: PgPool,
    tokens: Arc<TokenService>,
    mailer: Arc<Mailer>,
    frontend_url: String,
}

impl AuthService {
    pub fn new(
        pool: PgPool,
        tokens: Arc<TokenService>,
        mailer: Arc<Mailer>,
        frontend_url: String,
    ) -> Self {
        Self {
            pool,
            tokens,
            mailer,
            frontend_url: frontend_url.trim_end_matches('/').to_string(),
        }
    }

    /// Register a new, inactive user and mail them an activation link.
    ///
    /// Inactive users squatting on the email are purged first, so an
    /// abandoned registration never blocks a retry with the same address.
    pub async fn signup(&self, dto: SignupRequestDto) -> Result<UserResponseDto> {
        sqlx::query("DELETE FROM users WHERE email = $1 AND is_active = FALSE")
            .bind(&dto.email)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to purge inactive users: {:?}", e);
                AppError::Database(e)
            })?;

        let password_hash = password::hash(&dto.password)?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING
                id, username, email, password_hash, first_name, last_name,
                profile_bio, avatar_key, avatar_url, is_active, is_superuser,
                date_joined, updated_at
            "#,
        )
        .bind(&dto.username)
        .bind(&dto.email)
        .bind(&password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
                AppError::Conflict("Username or email is already taken".to_string())
            }
            _ => {
                tracing::error!("Failed to create user: {:?}", e);
                AppError::Database(e)
            }
        })?;

        let token =
            self.tokens
                .issue_action_token(user.id, TokenPurpose::Activation, None, None)?;
        let link = format!(
            "{}/activate?token={}",
            self.frontend_url,
            urlencoding::encode(&token)
        );

        let mut ctx: HashMap<&str, Value> = HashMap::new();
        ctx.insert("username", Value::from(user.username.clone()));
        ctx.insert("link", Value::from(link));

        self.mailer
            .send_templated(&user.email, "signup", &ctx)
            .await?;

        tracing::info!(
            "User registered (pending activation): id={}, username={}",
            user.id,
            user.username
        );

        Ok(user.into())
    }

    /// Activate an account from a mailed token and log the user in.
    pub async fn activate(&self, token: &str) -> Result<AuthResponseDto> {
        let claims = self
            .tokens
            .verify_action_token(token, TokenPurpose::Activation)?;
        let user_id = claims.user_id()?;

        let user = self.find_by_id(user_id).await?;
        let user = user.ok_or_else(|| AppError::BadRequest("Invalid token".to_string()))?;

        if user.is_active {
            return Err(AppError::BadRequest(
                "Account is already activated".to_string(),
            ));
        }

        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET is_active = TRUE, updated_at = now()
            WHERE id = $1
            RETURNING
                id, username, email, password_hash, first_name, last_name,
                profile_bio, avatar_key, avatar_url, is_active, is_superuser,
                date_joined, updated_at
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to activate user: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::info!("User activated: id={}, username={}", user.id, user.username);

        self.auth_response(user)
    }

    /// Authenticate with email and password.
    pub async fn login(&self, dto: LoginRequestDto) -> Result<AuthResponseDto> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT
                id, username, email, password_hash, first_name, last_name,
                profile_bio, avatar_key, avatar_url, is_active, is_superuser,
                date_joined, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(&dto.email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to look up user by email: {:?}", e);
            AppError::Database(e)
        })?;

        // Same rejection for unknown email and wrong password
        let user = user.ok_or_else(|| {
            AppError::Unauthorized("Invalid email or password".to_string())
        })?;

        if !password::verify(&dto.password, &user.password_hash) {
            return Err(AppError::Unauthorized(
                "Invalid email or password".to_string(),
            ));
        }

        if !user.is_active {
            return Err(AppError::Forbidden(
                "Account is not activated".to_string(),
            ));
        }

        self.auth_response(user)
    }

    /// Fetch the profile of the authenticated user.
    pub async fn get_current_user(&self, user_id: Uuid) -> Result<UserResponseDto> {
        let user = self.find_by_id(user_id).await?;
        user.map(|u| u.into())
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
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

    fn auth_response(&self, user: User) -> Result<AuthResponseDto> {
        let (access_token, expires_in) =
            self.tokens
                .issue_access_token(user.id, &user.username, user.is_superuser)?;

        Ok(AuthResponseDto {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in,
            user: user.into(),
        })
    }
}
