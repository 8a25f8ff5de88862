use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::tags::models::{Tag, TagWithCount};
use crate::shared::validation::not_blank;

/// URL segment for a tag: its percent-encoded name
pub fn tag_slug(name: &str) -> String {
    urlencoding::encode(name).into_owned()
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TagResponseDto {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

impl From<Tag> for TagResponseDto {
    fn from(t: Tag) -> Self {
        Self {
            id: t.id,
            slug: tag_slug(&t.name),
            name: t.name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TagWithCountDto {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub cover_count: i64,
}

impl From<TagWithCount> for TagWithCountDto {
    fn from(t: TagWithCount) -> Self {
        Self {
            id: t.id,
            slug: tag_slug(&t.name),
            name: t.name,
            cover_count: t.cover_count,
        }
    }
}

/// Request DTO for creating or renaming a tag
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct TagNameDto {
    #[validate(
        length(max = 50, message = "must be at most 50 characters"),
        custom(function = "not_blank", message = "must not be blank")
    )]
    pub name: String,
}
