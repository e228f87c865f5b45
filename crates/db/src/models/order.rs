//! Placed orders with their frozen pricing.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use wardrobe_core::types::{DbId, Timestamp};

/// Status of a freshly created order.
pub const ORDER_STATUS_PLACED: &str = "placed";

/// An orders row from the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: DbId,
    pub reference: uuid::Uuid,
    pub wardrobe_id: Option<DbId>,
    pub customer_id: Option<DbId>,
    pub destination: Option<String>,
    pub snapshot: serde_json::Value,
    pub cut_list: serde_json::Value,
    /// All adjustments, internal ones included.
    pub adjustments: serde_json::Value,
    pub base_total: f64,
    pub final_price: f64,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Input for creating an order. The reference is generated on insert.
#[derive(Debug, Clone)]
pub struct CreateOrder {
    pub wardrobe_id: Option<DbId>,
    pub customer_id: Option<DbId>,
    pub destination: Option<String>,
    pub snapshot: serde_json::Value,
    pub cut_list: serde_json::Value,
    pub adjustments: serde_json::Value,
    pub base_total: f64,
    pub final_price: f64,
}
