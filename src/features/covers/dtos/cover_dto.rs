use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::covers::models::{Cover, CoverStatus};
use crate::features::tags::dtos::TagResponseDto;
use crate::shared::constants::MAX_DESCRIPTION_LENGTH;
use crate::shared::validation::not_blank;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CoverAuthorDto {
    pub nickname: Option<String>,
    pub avatar_url: Option<String>,
}

/// Response DTO for cover
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CoverResponseDto {
    pub uuid: Uuid,
    pub slug: String,
    pub img_description: String,
    pub original_description: Option<String>,
    pub img_size: String,
    pub img_url: String,
    pub llm_name: String,
    #[schema(value_type = Object)]
    pub llm_params: Value,
    pub status: CoverStatus,
    pub category_id: Option<i64>,
    pub category_name: Option<String>,
    pub author: CoverAuthorDto,
    pub created_at: DateTime<Utc>,
}

impl From<Cover> for CoverResponseDto {
    fn from(c: Cover) -> Self {
        Self {
            uuid: c.uuid,
            slug: c.slug,
            img_description: c.img_description,
            original_description: c.original_description,
            img_size: c.img_size,
            img_url: c.img_url,
            llm_name: c.llm_name,
            llm_params: c.llm_params,
            status: c.status,
            category_id: c.category_id,
            category_name: c.category_name,
            author: CoverAuthorDto {
                nickname: c.user_nickname,
                avatar_url: c.user_avatar_url,
            },
            created_at: c.created_at,
        }
    }
}

/// Cover detail page payload
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CoverDetailDto {
    #[serde(flatten)]
    pub cover: CoverResponseDto,
    pub tags: Vec<TagResponseDto>,
    /// Whether the viewer generated this cover
    pub is_owner: bool,
    /// Canonical location when the cover was requested by uuid
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_to: Option<String>,
}

/// Gallery filters on top of pagination
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CoverListQuery {
    /// Only covers in this category
    pub category_id: Option<i64>,
    /// Shuffle instead of newest first
    #[serde(default)]
    pub random: bool,
}

/// Request DTO for generating a cover
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct GenerateCoverDto {
    /// Text the image is generated from (possibly LLM-optimised)
    #[validate(
        length(max = MAX_DESCRIPTION_LENGTH, message = "must be at most 2000 characters"),
        custom(function = "not_blank", message = "must not be blank")
    )]
    pub description: String,
    /// What the user typed before optimisation
    #[validate(length(max = MAX_DESCRIPTION_LENGTH, message = "must be at most 2000 characters"))]
    pub original_description: Option<String>,
    pub category_id: Option<i64>,
    pub tag_id: Option<i64>,
}

/// Request DTO for moderating a cover
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateCoverStatusDto {
    pub status: CoverStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dto(description: &str) -> GenerateCoverDto {
        GenerateCoverDto {
            description: description.to_string(),
            original_description: None,
            category_id: None,
            tag_id: None,
        }
    }

    #[test]
    fn test_description_rules() {
        assert!(dto("A fox reading a book").validate().is_ok());
        assert!(dto(" \n ").validate().is_err());
        assert!(dto(&"a".repeat(2001)).validate().is_err());
        assert!(dto(&"a".repeat(2000)).validate().is_ok());
    }

    #[test]
    fn test_status_serialises_lowercase() {
        let json = serde_json::to_value(UpdateCoverStatusDto {
            status: CoverStatus::Hidden,
        })
        .unwrap();
        assert_eq!(json["status"], "hidden");
    }
}
