//! Parametric wardrobe description as authored by the editor.
//!
//! A snapshot is always handed in whole; every computation over it is a
//! full recomputation. Grid geometry is derived by [`layout::Layout`].

pub mod entry;
pub mod key;
pub mod layout;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::types::DbId;

pub use entry::Entry;
pub use key::{element_letter, CompartmentKey};
pub use layout::{Bounds, DoorPlacement, Layout, LayoutColumn, LayoutError, Slot};

/// The complete design of one wardrobe. All lengths are in centimeters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct WardrobeSnapshot {
    /// Display name; cosmetic.
    #[serde(default)]
    pub name: Option<String>,
    #[validate(range(exclusive_min = 0.0))]
    pub width: f64,
    #[validate(range(exclusive_min = 0.0))]
    pub height: f64,
    #[validate(range(exclusive_min = 0.0))]
    pub depth: f64,
    #[serde(default)]
    pub korpus_material_id: Option<DbId>,
    #[serde(default)]
    pub front_material_id: Option<DbId>,
    #[serde(default)]
    pub back_material_id: Option<DbId>,
    #[serde(default)]
    pub has_base: bool,
    #[serde(default)]
    pub base_height: f64,
    /// Interior column seams, measured from the left edge.
    #[serde(default)]
    pub vertical_boundaries: Vec<f64>,
    /// Shelf positions per column, measured from the carcass floor.
    #[serde(default)]
    pub horizontal_boundaries: Vec<Vec<f64>>,
    /// Height at which the carcass splits into a bottom and a top module.
    #[serde(default)]
    pub module_boundary: Option<f64>,
    /// Sub-column layout keyed by column index (`"0"`, `"1"`, ...).
    #[serde(default)]
    pub element_configs: BTreeMap<String, Entry<ElementConfig>>,
    /// Keyed by compartment key (`"A1"`); keys are parsed during layout resolution.
    #[serde(default)]
    pub compartment_extras: BTreeMap<String, Entry<CompartmentExtras>>,
    #[serde(default)]
    pub door_groups: Vec<Entry<DoorGroup>>,
}

fn default_sub_columns() -> u32 {
    1
}

/// Internal layout of a column's floor compartment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementConfig {
    #[serde(default = "default_sub_columns")]
    pub sub_columns: u32,
    /// Drawers stacked in each sub-column, left to right. Missing entries mean none.
    #[serde(default)]
    pub drawer_counts: Vec<u32>,
}

impl ElementConfig {
    pub fn drawer_total(&self) -> u32 {
        self.drawer_counts
            .iter()
            .fold(0, |total: u32, &n| total.saturating_add(n))
    }

    pub fn drawers_in(&self, sub_column: usize) -> u32 {
        self.drawer_counts.get(sub_column).copied().unwrap_or(0)
    }
}

/// Per-compartment additions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompartmentExtras {
    #[serde(default)]
    pub divider: bool,
    #[serde(default)]
    pub drawers: bool,
    #[serde(default)]
    pub drawers_count: u32,
    #[serde(default)]
    pub rod: bool,
    #[serde(default)]
    pub led: bool,
}

impl CompartmentExtras {
    /// Drawers filling the whole compartment; zero unless `drawers` is set.
    pub fn drawer_count(&self) -> u32 {
        if self.drawers {
            self.drawers_count
        } else {
            0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoorType {
    None,
    Left,
    Right,
    Double,
    LeftMirror,
    RightMirror,
    DoubleMirror,
    DrawerStyle,
    #[serde(other)]
    Unknown,
}

impl DoorType {
    /// Number of physical leaves (panels) the door consists of.
    pub fn leaf_count(self) -> u32 {
        match self {
            Self::None | Self::Unknown => 0,
            Self::Left | Self::Right | Self::LeftMirror | Self::RightMirror | Self::DrawerStyle => 1,
            Self::Double | Self::DoubleMirror => 2,
        }
    }

    pub fn is_mirror(self) -> bool {
        matches!(self, Self::LeftMirror | Self::RightMirror | Self::DoubleMirror)
    }

    /// Door kind with the mirror finish stripped.
    pub fn kind(self) -> Option<&'static str> {
        match self {
            Self::Left | Self::LeftMirror => Some("left"),
            Self::Right | Self::RightMirror => Some("right"),
            Self::Double | Self::DoubleMirror => Some("double"),
            Self::DrawerStyle => Some("drawer_style"),
            Self::None | Self::Unknown => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::None => "No door",
            Self::Left => "Door (left hinge)",
            Self::Right => "Door (right hinge)",
            Self::Double => "Double door leaf",
            Self::LeftMirror => "Mirror door (left hinge)",
            Self::RightMirror => "Mirror door (right hinge)",
            Self::DoubleMirror => "Mirror double door leaf",
            Self::DrawerStyle => "Drawer-style front",
            Self::Unknown => "Unknown door",
        }
    }
}

/// All door kinds, used to pre-populate rule context breakdowns.
pub const DOOR_KINDS: &[&str] = &["left", "right", "double", "drawer_style"];

/// One door leaf or pair covering one or more compartments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoorGroup {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub door_type: DoorType,
    pub compartments: Vec<CompartmentKey>,
    #[serde(default)]
    pub handle_id: Option<DbId>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn snapshot_deserializes_with_defaults() {
        let snapshot: WardrobeSnapshot = serde_json::from_value(json!({
            "width": 200.0,
            "height": 220.0,
            "depth": 60.0,
            "korpus_material_id": 1,
            "compartment_extras": { "A1": { "rod": true } },
            "door_groups": [{ "type": "double_mirror", "compartments": ["A1"] }]
        }))
        .unwrap();

        assert!(!snapshot.has_base);
        assert!(snapshot.vertical_boundaries.is_empty());
        let extras = snapshot.compartment_extras["A1"].parsed().unwrap();
        assert!(extras.rod);
        assert_eq!(extras.drawer_count(), 0);
        let door = snapshot.door_groups[0].parsed().unwrap();
        assert_eq!(door.door_type, DoorType::DoubleMirror);
    }

    #[test]
    fn one_malformed_entry_keeps_its_siblings() {
        let snapshot: WardrobeSnapshot = serde_json::from_value(json!({
            "width": 200.0, "height": 220.0, "depth": 60.0,
            "element_configs": { "0": { "sub_columns": -2 } },
            "compartment_extras": {
                "A1": { "rod": true },
                "A2": { "drawers_count": -1 },
                "A3": { "rod": "yes" },
                "1A": { "led": true }
            },
            "door_groups": [
                { "type": "left", "compartments": ["A1"] },
                { "type": "left", "compartments": ["not a key"] }
            ]
        }))
        .unwrap();

        assert!(snapshot.element_configs["0"].parsed().is_err());
        assert!(snapshot.compartment_extras["A1"].parsed().unwrap().rod);
        assert!(snapshot.compartment_extras["A2"].parsed().is_err());
        assert!(snapshot.compartment_extras["A3"].parsed().is_err());
        assert!(snapshot.compartment_extras["1A"].parsed().is_ok());
        assert!(snapshot.door_groups[0].parsed().is_ok());
        assert!(snapshot.door_groups[1].parsed().is_err());

        let stored = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(stored["compartment_extras"]["A3"], json!({ "rod": "yes" }));
    }

    #[test]
    fn drawer_total_saturates() {
        let config = ElementConfig {
            sub_columns: 2,
            drawer_counts: vec![u32::MAX, 1],
        };
        assert_eq!(config.drawer_total(), u32::MAX);
    }

    #[test]
    fn unknown_door_type_deserializes_as_unknown() {
        let group: DoorGroup =
            serde_json::from_value(json!({ "type": "sliding", "compartments": ["A1"] })).unwrap();
        assert_eq!(group.door_type, DoorType::Unknown);
        assert_eq!(group.door_type.leaf_count(), 0);
    }

    #[test]
    fn element_config_defaults_to_one_sub_column() {
        let config: ElementConfig = serde_json::from_value(json!({})).unwrap();
        assert_eq!(config.sub_columns, 1);
        assert_eq!(config.drawers_in(3), 0);
    }

    #[test]
    fn drawers_count_ignored_without_flag() {
        let extras = CompartmentExtras {
            drawers: false,
            drawers_count: 3,
            ..Default::default()
        };
        assert_eq!(extras.drawer_count(), 0);
    }

    #[test]
    fn mirror_variants_share_kind() {
        assert_eq!(DoorType::DoubleMirror.kind(), DoorType::Double.kind());
        assert_eq!(DoorType::DoubleMirror.leaf_count(), 2);
        assert!(DoorType::LeftMirror.is_mirror());
        assert!(!DoorType::DrawerStyle.is_mirror());
    }

    #[test]
    fn non_positive_dimensions_fail_validation() {
        let snapshot: WardrobeSnapshot = serde_json::from_value(json!({
            "width": 0.0, "height": 220.0, "depth": 60.0
        }))
        .unwrap();
        assert!(snapshot.validate().is_err());
    }
}
