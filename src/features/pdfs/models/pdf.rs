use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct Pdf {
    pub id: i64,
    pub uuid: Uuid,
    pub cover_uuid: Uuid,
    pub url: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
}
