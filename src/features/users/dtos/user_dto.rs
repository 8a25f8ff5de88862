use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::users::models::User;
use crate::shared::validation::not_blank;

/// Current user as shown in the account menu
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserProfileDto {
    pub email: String,
    pub uuid: Uuid,
    pub nickname: String,
    pub avatar_url: Option<String>,
    pub credits: i32,
    pub covers_count: i64,
    pub created_at: DateTime<Utc>,
}

impl UserProfileDto {
    pub fn new(user: User, covers_count: i64) -> Self {
        Self {
            email: user.email,
            uuid: user.uuid,
            nickname: user.nickname,
            avatar_url: user.avatar_url,
            credits: user.credits,
            covers_count,
            created_at: user.created_at,
        }
    }
}

/// Fields a user may change about themselves. Omitted fields are kept.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct UpdateProfileDto {
    #[validate(
        length(max = 50, message = "must be at most 50 characters"),
        custom(function = "not_blank", message = "must not be blank")
    )]
    pub nickname: Option<String>,
    #[validate(url(message = "must be a valid URL"))]
    pub avatar_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_profile_validation() {
        let ok = UpdateProfileDto {
            nickname: Some("Ada".to_string()),
            avatar_url: None,
        };
        assert!(ok.validate().is_ok());

        let empty = UpdateProfileDto {
            nickname: None,
            avatar_url: None,
        };
        assert!(empty.validate().is_ok());

        let bad = UpdateProfileDto {
            nickname: Some(" ".to_string()),
            avatar_url: Some("avatar.png".to_string()),
        };
        let errors = bad.validate().unwrap_err();
        assert_eq!(errors.field_errors().len(), 2);
    }
}
