//! Repository for the `customers` table.

use sqlx::PgPool;
use wardrobe_core::types::DbId;

use crate::models::customer::CustomerRow;

const COLUMNS: &str = "id, email, name, tags, created_at, updated_at";

pub struct CustomerRepo;

impl CustomerRepo {
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<CustomerRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM customers WHERE id = $1");
        sqlx::query_as::<_, CustomerRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
