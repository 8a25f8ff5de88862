use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for category
#[derive(Debug, Clone, FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub parent_id: Option<i64>,
    /// Depth in the tree, 0 for roots
    pub level: i32,
    pub preview_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Root category together with the number of direct children
#[derive(Debug, Clone, FromRow)]
pub struct ParentCategory {
    pub id: i64,
    pub name: String,
    pub preview_image: Option<String>,
    pub children_count: i64,
}
