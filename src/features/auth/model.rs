use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::shared::constants::ROLE_ADMIN;

/// Identity established from a validated access token.
///
/// The email is the key users are stored under.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    pub sub: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    pub roles: Vec<String>,
}

impl AuthenticatedUser {
    /// Check if user has a specific role
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(ROLE_ADMIN)
    }

    /// Display name, falling back to the local part of the email
    pub fn nickname(&self) -> String {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| {
                self.email
                    .split('@')
                    .next()
                    .unwrap_or_default()
                    .to_string()
            })
    }
}

#[cfg(test)]
mod tests {
    use crate::shared::test_helpers::{create_admin_user, create_user};

    #[test]
    fn test_roles() {
        assert!(create_admin_user().is_admin());
        assert!(!create_user("a@b.c").is_admin());
    }

    #[test]
    fn test_nickname_falls_back_to_email() {
        let mut user = create_user("ada@example.com");
        assert_eq!(user.nickname(), "Test User");
        user.name = Some("  ".to_string());
        assert_eq!(user.nickname(), "ada");
        user.name = None;
        assert_eq!(user.nickname(), "ada");
    }
}
