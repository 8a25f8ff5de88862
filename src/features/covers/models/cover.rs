use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

/// Gallery visibility of a cover
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "cover_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CoverStatus {
    Visible,
    Hidden,
}

/// Cover row joined with its author and category
#[derive(Debug, Clone, FromRow)]
pub struct Cover {
    pub id: i64,
    pub uuid: Uuid,
    pub slug: String,
    pub user_email: String,
    pub img_description: String,
    pub original_description: Option<String>,
    pub img_size: String,
    pub img_url: String,
    pub llm_name: String,
    pub llm_params: Value,
    pub status: CoverStatus,
    pub category_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user_nickname: Option<String>,
    pub user_avatar_url: Option<String>,
    pub category_name: Option<String>,
}

/// Data for inserting a new cover
#[derive(Debug, Clone)]
pub struct NewCover {
    pub uuid: Uuid,
    pub slug: String,
    pub user_email: String,
    pub img_description: String,
    pub original_description: Option<String>,
    pub img_size: String,
    pub img_url: String,
    pub llm_name: String,
    pub llm_params: Value,
    pub category_id: Option<i64>,
}
