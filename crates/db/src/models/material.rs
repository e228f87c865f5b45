//! `materials` rows.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use wardrobe_core::material::{Material, MaterialType};
use wardrobe_core::types::{DbId, Timestamp};

/// A materials row from the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct MaterialRow {
    pub id: DbId,
    pub name: String,
    pub price: f64,
    pub thickness_mm: f64,
    pub categories: Vec<String>,
    pub stock: i32,
    pub finish: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<MaterialRow> for Material {
    /// Unknown category tags are dropped with a warning.
    fn from(row: MaterialRow) -> Self {
        let categories = row
            .categories
            .iter()
            .filter_map(|tag| {
                let parsed = MaterialType::from_tag(tag);
                if parsed.is_none() {
                    tracing::warn!(material_id = row.id, tag = %tag, "Ignoring unknown material category");
                }
                parsed
            })
            .collect();

        Material {
            id: row.id,
            name: row.name,
            price: row.price,
            thickness_mm: row.thickness_mm,
            categories,
            stock: row.stock,
            finish: row.finish,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn unknown_categories_are_dropped() {
        let row = MaterialRow {
            id: 3,
            name: "Oak".into(),
            price: 2500.0,
            thickness_mm: 18.0,
            categories: vec!["Korpus".into(), "glass".into(), "front".into()],
            stock: 4,
            finish: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let material = Material::from(row);
        assert_eq!(
            material.categories,
            vec![MaterialType::Korpus, MaterialType::Front]
        );
    }
}
