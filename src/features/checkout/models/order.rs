use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "order_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Created,
    Paid,
}

#[derive(Debug, Clone, FromRow)]
pub struct Order {
    pub order_no: String,
    pub user_email: String,
    pub plan: String,
    /// Minor currency units
    pub amount: i64,
    pub currency: String,
    pub credits: i32,
    pub status: OrderStatus,
    pub stripe_session_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
}
