//! Material catalog reference data.
//!
//! Boards (korpus, front, back) are priced per square meter; handles are
//! priced per piece. The catalog is immutable once loaded.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::DbId;

/// Which part of the wardrobe a material may be used for, and which price a
/// cut list item is charged against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialType {
    Korpus,
    Front,
    Back,
    Handles,
}

impl MaterialType {
    /// Parse a category tag as stored in the database.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "korpus" => Some(Self::Korpus),
            "front" => Some(Self::Front),
            "back" => Some(Self::Back),
            "handles" | "handle" => Some(Self::Handles),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Korpus => "korpus",
            Self::Front => "front",
            Self::Back => "back",
            Self::Handles => "handles",
        }
    }
}

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub id: DbId,
    pub name: String,
    /// Price per m² for boards, per piece for handles.
    pub price: f64,
    pub thickness_mm: f64,
    #[serde(default)]
    pub categories: Vec<MaterialType>,
    #[serde(default)]
    pub stock: i32,
    /// Visible finish (e.g. "chrome", "matte black"). Used for handles.
    #[serde(default)]
    pub finish: Option<String>,
}

impl Material {
    pub fn is_eligible_for(&self, material_type: MaterialType) -> bool {
        self.categories.contains(&material_type)
    }

    /// Panel thickness in centimeters.
    pub fn thickness_cm(&self) -> f64 {
        self.thickness_mm / 10.0
    }
}

/// Material lookup by id.
#[derive(Debug, Clone, Default)]
pub struct MaterialCatalog {
    materials: BTreeMap<DbId, Material>,
}

impl MaterialCatalog {
    pub fn new(materials: impl IntoIterator<Item = Material>) -> Self {
        Self {
            materials: materials.into_iter().map(|m| (m.id, m)).collect(),
        }
    }

    pub fn get(&self, id: DbId) -> Option<&Material> {
        self.materials.get(&id)
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Material> {
        self.materials.values()
    }

    /// Look up a handle; entries without the handles category are ignored.
    pub fn handle(&self, id: DbId) -> Option<&Material> {
        self.get(id)
            .filter(|m| m.is_eligible_for(MaterialType::Handles))
    }
}

/// A handle as seen by business rules: identity and finish only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Handle {
    pub id: DbId,
    pub name: String,
    pub finish: Option<String>,
}

/// Handle id to finish lookup used by the rule context builder.
#[derive(Debug, Clone, Default)]
pub struct HandleCatalog {
    handles: BTreeMap<DbId, Handle>,
}

impl HandleCatalog {
    pub fn new(handles: impl IntoIterator<Item = Handle>) -> Self {
        Self {
            handles: handles.into_iter().map(|h| (h.id, h)).collect(),
        }
    }

    /// Derive the handle catalog from the handle entries of a material catalog.
    pub fn from_materials(catalog: &MaterialCatalog) -> Self {
        Self::new(
            catalog
                .iter()
                .filter(|m| m.is_eligible_for(MaterialType::Handles))
                .map(|m| Handle {
                    id: m.id,
                    name: m.name.clone(),
                    finish: m.finish.clone(),
                }),
        )
    }

    pub fn get(&self, id: DbId) -> Option<&Handle> {
        self.handles.get(&id)
    }

    /// All distinct finishes, normalized to lowercase.
    pub fn finishes(&self) -> impl Iterator<Item = String> + '_ {
        self.handles
            .values()
            .filter_map(|h| h.finish.as_deref())
            .map(normalize_finish)
    }
}

/// Finish names are matched case-insensitively by rules.
pub fn normalize_finish(finish: &str) -> String {
    finish.trim().to_lowercase()
}
