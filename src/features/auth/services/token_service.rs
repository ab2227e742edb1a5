//! JWT issuing and verification.
//!
//! Two token families share the same HS256 secret:
//!
//! - **Access tokens** authenticate API requests (bearer header).
//! - **Action tokens** are signed, expiring, single-purpose tokens carried in
//!   mail links: account activation, email change confirmation, and password
//!   reset. The `purpose` claim prevents a token issued for one flow from
//!   being replayed in another. Password-reset tokens additionally embed a
//!   fingerprint of the current password hash, so they stop working as soon
//!   as the password changes.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::time::Duration;
use uuid::Uuid;

use crate::core::config::AuthConfig;
use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;

/// What an action token is allowed to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    Activation,
    EmailChange,
    PasswordReset,
}

/// Claims of an API access token
#[derive(Debug, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: String,
    pub username: String,
    #[serde(default)]
    pub superuser: bool,
    pub iss: String,
    pub iat: u64,
    pub exp: u64,
}

/// Claims of a signed one-time action token
#[derive(Debug, Serialize, Deserialize)]
pub struct ActionClaims {
    pub sub: String,
    pub purpose: TokenPurpose,
    /// New address for email-change tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Password-hash fingerprint for password-reset tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pwd: Option<String>,
    pub iss: String,
    pub iat: u64,
    pub exp: u64,
}

impl ActionClaims {
    /// Parse the subject claim as a user id
    pub fn user_id(&self) -> Result<Uuid> {
        Uuid::parse_str(&self.sub)
            .map_err(|_| AppError::BadRequest("Invalid token".to_string()))
    }
}

/// Service for issuing and verifying JWTs
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    access_token_ttl: Duration,
    action_token_ttl: Duration,
    leeway: Duration,
}

impl TokenService {
    pub fn new(config: AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            issuer: config.issuer,
            access_token_ttl: config.access_token_ttl,
            action_token_ttl: config.action_token_ttl,
            leeway: config.jwt_leeway,
        }
    }

    fn now() -> u64 {
        chrono::Utc::now().timestamp().max(0) as u64
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = self.leeway.as_secs();
        validation.set_issuer(&[self.issuer.as_str()]);
        validation
    }

    /// Issue an access token for the given user.
    ///
    /// Returns the token and its lifetime in seconds.
    pub fn issue_access_token(
        &self,
        user_id: Uuid,
        username: &str,
        is_superuser: bool,
    ) -> Result<(String, u64)> {
        let now = Self::now();
        let expires_in = self.access_token_ttl.as_secs();
        let claims = AccessClaims {
            sub: user_id.to_string(),
            username: username.to_string(),
            superuser: is_superuser,
            iss: self.issuer.clone(),
            iat: now,
            exp: now + expires_in,
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign access token: {}", e)))?;

        Ok((token, expires_in))
    }

    /// Verify an access token and extract the authenticated user.
    pub fn verify_access_token(&self, token: &str) -> Result<AuthenticatedUser> {
        let data = decode::<AccessClaims>(token, &self.decoding_key, &self.validation())
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::Unauthorized("Token expired".to_string())
                }
                _ => AppError::Unauthorized("Invalid token".to_string()),
            })?;

        let id = Uuid::parse_str(&data.claims.sub)
            .map_err(|_| AppError::Unauthorized("Invalid token".to_string()))?;

        Ok(AuthenticatedUser {
            id,
            username: data.claims.username,
            is_superuser: data.claims.superuser,
        })
    }

    /// Issue a signed action token for a mail link.
    pub fn issue_action_token(
        &self,
        user_id: Uuid,
        purpose: TokenPurpose,
        email: Option<String>,
        pwd: Option<String>,
    ) -> Result<String> {
        self.issue_action_token_with_ttl(user_id, purpose, email, pwd, self.action_token_ttl)
    }

    fn issue_action_token_with_ttl(
        &self,
        user_id: Uuid,
        purpose: TokenPurpose,
        email: Option<String>,
        pwd: Option<String>,
        ttl: Duration,
    ) -> Result<String> {
        let now = Self::now();
        let claims = ActionClaims {
            sub: user_id.to_string(),
            purpose,
            email,
            pwd,
            iss: self.issuer.clone(),
            iat: now,
            exp: now + ttl.as_secs(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign action token: {}", e)))
    }

    /// Verify an action token and check it was issued for the expected flow.
    ///
    /// Expired tokens and tokens with a bad signature or the wrong purpose are
    /// all rejected as bad requests, mirroring how the mail links are consumed.
    pub fn verify_action_token(
        &self,
        token: &str,
        expected: TokenPurpose,
    ) -> Result<ActionClaims> {
        let data = decode::<ActionClaims>(token, &self.decoding_key, &self.validation())
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::BadRequest("Token has expired".to_string())
                }
                _ => AppError::BadRequest("Invalid token".to_string()),
            })?;

        if data.claims.purpose != expected {
            return Err(AppError::BadRequest("Invalid token".to_string()));
        }

        Ok(data.claims)
    }

    /// Fingerprint of a password hash, embedded in password-reset tokens.
    ///
    /// Changing the password changes the fingerprint, invalidating any
    /// outstanding reset token.
    pub fn password_fingerprint(password_hash: &str) -> String {
        let digest = Sha256::digest(password_hash.as_bytes());
        hex::encode(&digest[..8])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::AuthConfig;

    fn test_config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret-test-secret-test-secret!".to_string(),
            issuer: "agora-test".to_string(),
            access_token_ttl: Duration::from_secs(3600),
            action_token_ttl: Duration::from_secs(86400),
            jwt_leeway: Duration::from_secs(0),
        }
    }

    fn service() -> TokenService {
        TokenService::new(test_config())
    }

    #[test]
    fn test_access_token_round_trip() {
        let svc = service();
        let id = Uuid::new_v4();

        let (token, expires_in) = svc.issue_access_token(id, "alice", false).unwrap();
        assert_eq!(expires_in, 3600);

        let user = svc.verify_access_token(&token).unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.username, "alice");
        assert!(!user.is_superuser);
    }

    #[test]
    fn test_access_token_rejects_garbage() {
        let svc = service();
        let err = svc.verify_access_token("not-a-token").unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn test_access_token_rejects_wrong_secret() {
        let svc = service();
        let mut other_config = test_config();
        other_config.jwt_secret = "another-secret-another-secret-secret".to_string();
        let other = TokenService::new(other_config);

        let (token, _) = other
            .issue_access_token(Uuid::new_v4(), "mallory", false)
            .unwrap();
        assert!(svc.verify_access_token(&token).is_err());
    }

    #[test]
    fn test_action_token_round_trip() {
        let svc = service();
        let id = Uuid::new_v4();

        let token = svc
            .issue_action_token(id, TokenPurpose::Activation, None, None)
            .unwrap();
        let claims = svc
            .verify_action_token(&token, TokenPurpose::Activation)
            .unwrap();
        assert_eq!(claims.user_id().unwrap(), id);
    }

    #[test]
    fn test_action_token_rejects_wrong_purpose() {
        let svc = service();
        let token = svc
            .issue_action_token(Uuid::new_v4(), TokenPurpose::Activation, None, None)
            .unwrap();

        let err = svc
            .verify_action_token(&token, TokenPurpose::PasswordReset)
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_action_token_expires() {
        let svc = service();
        // Issued with a TTL in the past relative to validation (leeway is 0,
        // and jsonwebtoken treats exp <= now as expired)
        let token = svc
            .issue_action_token_with_ttl(
                Uuid::new_v4(),
                TokenPurpose::EmailChange,
                Some("new@example.com".to_string()),
                None,
                Duration::ZERO,
            )
            .unwrap();

        std::thread::sleep(std::time::Duration::from_millis(1100));

        let err = svc
            .verify_action_token(&token, TokenPurpose::EmailChange)
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(ref msg) if msg.contains("expired")));
    }

    #[test]
    fn test_email_change_token_carries_address() {
        let svc = service();
        let token = svc
            .issue_action_token(
                Uuid::new_v4(),
                TokenPurpose::EmailChange,
                Some("new@example.com".to_string()),
                None,
            )
            .unwrap();

        let claims = svc
            .verify_action_token(&token, TokenPurpose::EmailChange)
            .unwrap();
        assert_eq!(claims.email.as_deref(), Some("new@example.com"));
    }

    #[test]
    fn test_password_fingerprint_changes_with_hash() {
        let a = TokenService::password_fingerprint("$argon2id$v=19$m=19456,t=2,p=1$aaa$bbb");
        let b = TokenService::password_fingerprint("$argon2id$v=19$m=19456,t=2,p=1$ccc$ddd");
        assert_ne!(a, b);
        assert_eq!(a.len(), 16);
    }
}
