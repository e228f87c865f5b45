//! Flattened facts that pricing rules can test.
//!
//! Rebuilt from scratch for every evaluation and never persisted. Rules
//! address fields with dotted paths over the serialized form, e.g.
//! `wardrobe.door_type_finishes.double.chrome` or `customer.tags`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::material::{normalize_finish, HandleCatalog};
use crate::snapshot::{Layout, WardrobeSnapshot, DOOR_KINDS};
use crate::types::DbId;

/// Customer record as far as pricing is concerned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: DbId,
    pub email: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleContext {
    pub wardrobe: WardrobeMetrics,
    pub customer: CustomerInfo,
    pub order: OrderInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WardrobeMetrics {
    pub width: f64,
    pub height: f64,
    pub depth: f64,
    /// Front area in m².
    pub area: f64,
    pub column_count: u32,
    pub door_count: u32,
    pub drawer_count: u32,
    pub shelf_count: u32,
    pub rod_count: u32,
    pub led_count: u32,
    /// Compartments split by a divider.
    pub divider_count: u32,
    /// Columns split into more than one sub-column.
    pub vertical_divider_count: u32,
    pub has_base: bool,
    pub has_mirror: bool,
    pub mirror_door_count: u32,
    pub korpus_material_id: Option<DbId>,
    pub front_material_id: Option<DbId>,
    pub back_material_id: Option<DbId>,
    /// Door groups per kind (`left`, `right`, `double`, `drawer_style`).
    pub door_types: BTreeMap<String, u32>,
    /// Handle pieces per finish.
    pub handle_finishes: BTreeMap<String, u32>,
    /// Door groups per kind per handle finish.
    pub door_type_finishes: BTreeMap<String, BTreeMap<String, u32>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub id: Option<DbId>,
    pub email: Option<String>,
    pub tags: Vec<String>,
    pub prior_order_count: u32,
    pub is_returning: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderInfo {
    /// Total at the start of rule evaluation.
    pub total: f64,
    pub destination: Option<String>,
}

/// Derive the rule context. Pure aggregation; an unresolvable snapshot
/// yields zero counts rather than an error.
pub fn build_rule_context(
    snapshot: &WardrobeSnapshot,
    handles: &HandleCatalog,
    customer: Option<&Customer>,
    prior_order_count: u32,
    order: OrderInfo,
) -> RuleContext {
    RuleContext {
        wardrobe: wardrobe_metrics(snapshot, handles),
        customer: CustomerInfo {
            id: customer.map(|c| c.id),
            email: customer.and_then(|c| c.email.clone()),
            tags: customer.map(|c| c.tags.clone()).unwrap_or_default(),
            prior_order_count,
            is_returning: prior_order_count > 0,
        },
        order,
    }
}

fn wardrobe_metrics(snapshot: &WardrobeSnapshot, handles: &HandleCatalog) -> WardrobeMetrics {
    let finishes: Vec<String> = handles.finishes().collect();

    let mut metrics = WardrobeMetrics {
        width: snapshot.width,
        height: snapshot.height,
        depth: snapshot.depth,
        area: snapshot.width * snapshot.height / 10_000.0,
        korpus_material_id: snapshot.korpus_material_id,
        front_material_id: snapshot.front_material_id,
        back_material_id: snapshot.back_material_id,
        door_types: DOOR_KINDS.iter().map(|k| (k.to_string(), 0)).collect(),
        handle_finishes: finishes.iter().map(|f| (f.clone(), 0)).collect(),
        door_type_finishes: DOOR_KINDS
            .iter()
            .map(|k| (k.to_string(), finishes.iter().map(|f| (f.clone(), 0)).collect()))
            .collect(),
        ..Default::default()
    };

    let layout = match Layout::resolve(snapshot) {
        Ok(layout) => layout,
        Err(e) => {
            tracing::debug!(error = %e, "Rule context built without wardrobe layout");
            return metrics;
        }
    };

    metrics.column_count = layout.columns.len() as u32;
    metrics.drawer_count = layout.drawer_count();
    metrics.shelf_count = layout.shelf_count();
    metrics.rod_count = layout.rod_count();
    metrics.led_count = layout.led_count();
    metrics.divider_count = layout.compartment_divider_count();
    metrics.vertical_divider_count = layout.vertical_divider_count();
    metrics.has_base = layout.base_height > 0.0;

    for door in &layout.doors {
        let Some(kind) = door.door_type.kind() else {
            continue;
        };
        metrics.door_count += 1;
        *metrics.door_types.entry(kind.to_string()).or_insert(0) += 1;
        if door.door_type.is_mirror() {
            metrics.has_mirror = true;
            metrics.mirror_door_count += 1;
        }

        let finish = door
            .handle_id
            .and_then(|id| handles.get(id))
            .and_then(|h| h.finish.as_deref())
            .map(normalize_finish);
        if let Some(finish) = finish {
            *metrics.handle_finishes.entry(finish.clone()).or_insert(0) +=
                door.door_type.leaf_count();
            *metrics
                .door_type_finishes
                .entry(kind.to_string())
                .or_default()
                .entry(finish)
                .or_insert(0) += 1;
        }
    }

    metrics
}
