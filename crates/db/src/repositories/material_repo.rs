//! Repository for the `materials` table.

use sqlx::PgPool;

use crate::models::material::MaterialRow;

const COLUMNS: &str = "\
    id, name, price, thickness_mm, categories, stock, finish, created_at, updated_at";

/// Read access to the material catalog.
pub struct MaterialRepo;

impl MaterialRepo {
    /// The whole catalog, ordered by id.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<MaterialRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM materials ORDER BY id");
        sqlx::query_as::<_, MaterialRow>(&query).fetch_all(pool).await
    }
}
