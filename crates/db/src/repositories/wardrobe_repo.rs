//! Repository for the `wardrobes` table.

use sqlx::PgPool;
use wardrobe_core::types::DbId;

use crate::models::wardrobe::{SaveWardrobe, Wardrobe};

const COLUMNS: &str = "\
    id, customer_id, name, snapshot, cut_list, estimated_cost, created_at, updated_at";

/// Provides CRUD operations for saved designs.
pub struct WardrobeRepo;

impl WardrobeRepo {
    pub async fn create(pool: &PgPool, input: &SaveWardrobe) -> Result<Wardrobe, sqlx::Error> {
        let query = format!(
            "INSERT INTO wardrobes (customer_id, name, snapshot, cut_list, estimated_cost) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Wardrobe>(&query)
            .bind(input.customer_id)
            .bind(&input.name)
            .bind(&input.snapshot)
            .bind(&input.cut_list)
            .bind(input.estimated_cost)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Wardrobe>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM wardrobes WHERE id = $1");
        sqlx::query_as::<_, Wardrobe>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Replace the design and its estimate. The owning customer never changes.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &SaveWardrobe,
    ) -> Result<Option<Wardrobe>, sqlx::Error> {
        let query = format!(
            "UPDATE wardrobes SET \
                 name = $2, \
                 snapshot = $3, \
                 cut_list = $4, \
                 estimated_cost = $5, \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Wardrobe>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.snapshot)
            .bind(&input.cut_list)
            .bind(input.estimated_cost)
            .fetch_optional(pool)
            .await
    }
}
