//! Saved wardrobe designs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use wardrobe_core::types::{DbId, Money, Timestamp};

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A wardrobes row from the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Wardrobe {
    pub id: DbId,
    pub customer_id: Option<DbId>,
    pub name: Option<String>,
    pub snapshot: serde_json::Value,
    /// Cut list estimate; absent while the design is not yet priceable.
    pub cut_list: Option<serde_json::Value>,
    pub estimated_cost: Option<Money>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Write DTOs
// ---------------------------------------------------------------------------

/// Columns written on insert. Also used for full replacement on update.
#[derive(Debug, Clone)]
pub struct SaveWardrobe {
    pub customer_id: Option<DbId>,
    pub name: Option<String>,
    pub snapshot: serde_json::Value,
    pub cut_list: Option<serde_json::Value>,
    pub estimated_cost: Option<Money>,
}
