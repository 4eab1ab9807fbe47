use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const ORDER_STATUS_PENDING: &str = "pending";
pub const ORDER_STATUS_COMPLETED: &str = "completed";

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub item: String,
    pub amount_cents: i64,
    pub status: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrder {
    pub user_id: String,
    pub item: String,
    pub amount_cents: i64,
}
