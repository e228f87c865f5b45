//! `customers` rows.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use wardrobe_core::rule_context::Customer;
use wardrobe_core::types::{DbId, Timestamp};

/// A customers row from the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct CustomerRow {
    pub id: DbId,
    pub email: Option<String>,
    pub name: Option<String>,
    pub tags: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<CustomerRow> for Customer {
    fn from(row: CustomerRow) -> Self {
        Customer {
            id: row.id,
            email: row.email,
            tags: row.tags,
        }
    }
}
