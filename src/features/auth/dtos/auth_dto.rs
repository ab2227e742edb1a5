use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::accounts::dtos::UserResponseDto;

/// Request DTO for signup
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequestDto {
    #[validate(
        length(min = 1, max = 30, message = "Username must be 1-30 characters"),
        regex(
            path = "*crate::shared::validation::USERNAME_REGEX",
            message = "Username must start with letter or underscore and contain only alphanumeric characters and underscores"
        )
    )]
    pub username: String,

    #[validate(
        email(message = "Invalid email format"),
        length(max = 254, message = "Email must not exceed 254 characters")
    )]
    pub email: String,

    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,

    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub password_confirm: String,
}

/// Request DTO for account activation (token from the signup mail)
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivateRequestDto {
    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,
}

/// Request DTO for login
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequestDto {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Response DTO carrying a bearer token and the authenticated user
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponseDto {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub user: UserResponseDto,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_signup() -> SignupRequestDto {
        SignupRequestDto {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "hunter2hunter2".to_string(),
            password_confirm: "hunter2hunter2".to_string(),
        }
    }

    #[test]
    fn test_signup_dto_valid() {
        assert!(valid_signup().validate().is_ok());
    }

    #[test]
    fn test_signup_dto_rejects_password_mismatch() {
        let mut dto = valid_signup();
        dto.password_confirm = "something else".to_string();
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_signup_dto_rejects_short_password() {
        let mut dto = valid_signup();
        dto.password = "short".to_string();
        dto.password_confirm = "short".to_string();
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_signup_dto_rejects_bad_username() {
        let mut dto = valid_signup();
        dto.username = "1nvalid-name".to_string();
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_signup_dto_rejects_bad_email() {
        let mut dto = valid_signup();
        dto.email = "not-an-email".to_string();
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_signup_dto_accepts_generated_emails() {
        use fake::faker::internet::en::SafeEmail;
        use fake::Fake;

        for _ in 0..20 {
            let mut dto = valid_signup();
            dto.email = SafeEmail().fake();
            assert!(dto.validate().is_ok(), "rejected email: {}", dto.email);
        }
    }
}
