use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// User identity carried through request extensions after the bearer token
/// has been validated.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub username: String,
    pub is_superuser: bool,
}

impl AuthenticatedUser {
    /// Check if this user may act on the account with the given id
    /// (the account owner themself, or a superuser)
    pub fn can_manage(&self, user_id: Uuid) -> bool {
        self.id == user_id || self.is_superuser
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_can_manage_own_account() {
        let id = Uuid::new_v4();
        let user = AuthenticatedUser {
            id,
            username: "alice".to_string(),
            is_superuser: false,
        };
        assert!(user.can_manage(id));
        assert!(!user.can_manage(Uuid::new_v4()));
    }

    #[test]
    fn test_superuser_can_manage_any_account() {
        let user = AuthenticatedUser {
            id: Uuid::new_v4(),
            username: "admin".to_string(),
            is_superuser: true,
        };
        assert!(user.can_manage(Uuid::new_v4()));
    }
}
