//! Cut list calculator: wardrobe snapshot to manufacturable panels.
//!
//! Pure and deterministic. Every structural panel becomes one
//! [`CutListItem`], net of the thickness of the panels it butts against,
//! priced from the material its position calls for. Costs are rounded per
//! item so the total is always the exact sum of the displayed lines.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::material::{Material, MaterialCatalog, MaterialType};
use crate::snapshot::{Layout, LayoutColumn, Slot, WardrobeSnapshot};
use crate::types::Money;

// ---------------------------------------------------------------------------
// Manufacturing constants
// ---------------------------------------------------------------------------

/// Gap left around every door leaf and drawer front.
pub const DOOR_REVEAL_GAP_CM: f64 = 0.3;
/// Space taken by a drawer runner on each side of the box.
pub const DRAWER_RUNNER_CLEARANCE_CM: f64 = 1.3;
/// Space between the drawer box and the back panel.
pub const DRAWER_REAR_CLEARANCE_CM: f64 = 2.0;
/// How much lower the drawer box sides are than the front.
pub const DRAWER_BOX_HEADROOM_CM: f64 = 3.0;

/// cm² per m².
const CM2_PER_M2: f64 = 10_000.0;

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// One panel (or hardware line) to manufacture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CutListItem {
    /// `<element letter>-<nn>`, numbered within the element group.
    pub code: String,
    pub description: String,
    /// Centimeters.
    pub width: f64,
    /// Centimeters.
    pub height: f64,
    /// Millimeters.
    pub thickness: f64,
    /// Square meters.
    pub area: f64,
    pub cost: Money,
    /// Element group letter (the column the panel belongs to).
    pub element: String,
    pub material_type: MaterialType,
}

/// The manufacturing bill for one wardrobe, with the prices it was computed at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CutList {
    /// Items ordered by element group, then by position within the element.
    pub items: Vec<CutListItem>,
    pub price_per_m2: f64,
    pub front_price_per_m2: f64,
    pub back_price_per_m2: Option<f64>,
    pub total_area: f64,
    pub total_cost: Money,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl CutList {
    /// Items grouped by element letter, in cut list order.
    pub fn groups(&self) -> Vec<(&str, Vec<&CutListItem>)> {
        let mut groups: Vec<(&str, Vec<&CutListItem>)> = Vec::new();
        for item in &self.items {
            match groups.last_mut() {
                Some((element, items)) if *element == item.element => items.push(item),
                _ => groups.push((item.element.as_str(), vec![item])),
            }
        }
        groups
    }

    pub fn cost_by_material_type(&self) -> BTreeMap<MaterialType, Money> {
        let mut totals = BTreeMap::new();
        for item in &self.items {
            *totals.entry(item.material_type).or_insert(0) += item.cost;
        }
        totals
    }
}

// ---------------------------------------------------------------------------
// Calculation
// ---------------------------------------------------------------------------

/// Compute the cut list, or `None` when the wardrobe is not yet priceable
/// (missing korpus material, non-positive dimension, unbuildable base).
pub fn compute_cut_list(snapshot: &WardrobeSnapshot, materials: &MaterialCatalog) -> Option<CutList> {
    let Some(korpus_id) = snapshot.korpus_material_id else {
        tracing::debug!("No korpus material selected; wardrobe not yet priceable");
        return None;
    };
    let Some(korpus) = materials.get(korpus_id) else {
        tracing::debug!(korpus_id, "Korpus material not in catalog; wardrobe not yet priceable");
        return None;
    };

    let layout = match Layout::resolve(snapshot) {
        Ok(layout) => layout,
        Err(e) => {
            tracing::debug!(error = %e, "Wardrobe not yet priceable");
            return None;
        }
    };

    let mut builder = Builder::new(&layout, korpus);
    builder.check_eligibility(korpus, MaterialType::Korpus);

    if let Some(front_id) = snapshot.front_material_id {
        match materials.get(front_id) {
            Some(front) => {
                builder.check_eligibility(front, MaterialType::Front);
                builder.front = front;
            }
            None => builder.warn(format!(
                "front material {front_id} not in catalog; fronts priced as korpus"
            )),
        }
    }
    if let Some(back_id) = snapshot.back_material_id {
        match materials.get(back_id) {
            Some(back) => {
                builder.check_eligibility(back, MaterialType::Back);
                builder.back = Some(back);
            }
            None => builder.warn(format!(
                "back material {back_id} not in catalog; back panels omitted"
            )),
        }
    }

    let carcass_depth = layout.depth - builder.back.map_or(0.0, Material::thickness_cm);
    if carcass_depth <= 0.0 {
        tracing::debug!(carcass_depth, "Back panel leaves no carcass depth");
        return None;
    }
    builder.carcass_depth = carcass_depth;

    for column in &layout.columns {
        builder.add_carcass(column);
        builder.add_compartments(column);
    }
    builder.add_doors(materials);

    Some(builder.finish())
}

/// A panel before codes and costs are assigned.
struct Draft<'a> {
    description: String,
    width: f64,
    height: f64,
    material_type: MaterialType,
    material: &'a Material,
    per_piece: bool,
}

struct Builder<'a> {
    layout: &'a Layout,
    korpus: &'a Material,
    front: &'a Material,
    back: Option<&'a Material>,
    /// Korpus thickness in cm.
    t: f64,
    carcass_depth: f64,
    /// Drafts per column, in the order they were produced.
    groups: Vec<Vec<Draft<'a>>>,
    warnings: Vec<String>,
}

impl<'a> Builder<'a> {
    fn new(layout: &'a Layout, korpus: &'a Material) -> Self {
        Self {
            layout,
            korpus,
            front: korpus,
            back: None,
            t: korpus.thickness_cm(),
            carcass_depth: layout.depth,
            groups: (0..layout.columns.len()).map(|_| Vec::new()).collect(),
            warnings: layout.warnings.clone(),
        }
    }

    fn warn(&mut self, message: String) {
        tracing::warn!(detail = %message, "Cut list warning");
        self.warnings.push(message);
    }

    fn check_eligibility(&mut self, material: &Material, material_type: MaterialType) {
        if !material.is_eligible_for(material_type) {
            self.warn(format!(
                "material {} ({}) is not tagged for {} use",
                material.id,
                material.name,
                material_type.as_str()
            ));
        }
    }

    fn panel(
        &mut self,
        column: usize,
        description: String,
        width: f64,
        height: f64,
        material_type: MaterialType,
    ) {
        if !(width > 0.0 && height > 0.0) {
            self.warn(format!(
                "{description} in column {} would be {width:.1} x {height:.1} cm; skipped",
                self.layout.columns[column].letter
            ));
            return;
        }
        let material = match material_type {
            MaterialType::Front => self.front,
            MaterialType::Back => match self.back {
                Some(back) => back,
                None => return,
            },
            MaterialType::Korpus | MaterialType::Handles => self.korpus,
        };
        self.groups[column].push(Draft {
            description,
            width,
            height,
            material_type,
            material,
            per_piece: false,
        });
    }

    /// Thickness consumed at a horizontal line of the column.
    fn inset_at(&self, y: f64) -> f64 {
        if y <= 0.0 || y >= self.layout.body_height || self.layout.is_module_boundary(y) {
            self.t
        } else {
            self.t / 2.0
        }
    }

    fn inner_width(&self, column: &LayoutColumn) -> f64 {
        let last = column.index + 1 == self.layout.columns.len();
        let left = if column.index == 0 { self.t } else { self.t / 2.0 };
        let right = if last { self.t } else { self.t / 2.0 };
        column.width() - left - right
    }

    fn inner_height(&self, slot: &Slot) -> f64 {
        (slot.y1 - slot.y0) - self.inset_at(slot.y0) - self.inset_at(slot.y1)
    }

    /// Sides, top/bottom, module split, back and base of one column.
    fn add_carcass(&mut self, column: &LayoutColumn) {
        let i = column.index;
        let last = i + 1 == self.layout.columns.len();
        let modules = self.layout.modules();
        let split = modules.len() > 1;
        let depth = self.carcass_depth;

        for (m, &(y0, y1)) in modules.iter().enumerate() {
            let suffix = match (split, m) {
                (false, _) => String::new(),
                (true, 0) => " (bottom module)".to_string(),
                (true, _) => " (top module)".to_string(),
            };
            let side_height = (y1 - y0) - 2.0 * self.t;
            let left = if i == 0 { "Left side" } else { "Partition" };
            self.panel(i, format!("{left}{suffix}"), depth, side_height, MaterialType::Korpus);
            if last {
                self.panel(i, format!("Right side{suffix}"), depth, side_height, MaterialType::Korpus);
            }

            let bottom = if m == 0 { "Bottom" } else { "Module split (upper)" };
            let top = if m + 1 == modules.len() { "Top" } else { "Module split (lower)" };
            self.panel(i, format!("{bottom}{suffix}"), column.width(), depth, MaterialType::Korpus);
            self.panel(i, format!("{top}{suffix}"), column.width(), depth, MaterialType::Korpus);

            if self.back.is_some() {
                self.panel(i, format!("Back{suffix}"), column.width(), y1 - y0, MaterialType::Back);
            }
        }

        if self.layout.base_height > 0.0 {
            let base = self.layout.base_height;
            self.panel(i, "Base plinth".to_string(), column.width(), base, MaterialType::Korpus);
        }

        let inner_width = self.inner_width(column);
        for (n, _) in column.shelves.iter().enumerate() {
            self.panel(
                i,
                format!("Shelf {}", n + 1),
                inner_width,
                depth,
                MaterialType::Korpus,
            );
        }
    }

    /// Dividers and drawers inside the compartments of one column.
    ///
    /// In the floor compartment, element-config drawers take the lower part
    /// of the opening and whole-compartment drawers the upper part, in
    /// proportion to how many rows each stacks. Beside a compartment
    /// divider, drawers fill one half of the opening.
    fn add_compartments(&mut self, column: &LayoutColumn) {
        let i = column.index;
        let inner_width = self.inner_width(column);
        let depth = self.carcass_depth;

        for slot in &column.slots {
            let inner_height = self.inner_height(slot);
            let key = slot.key;
            let (divider, extra_count) = self
                .layout
                .extras
                .get(&key)
                .map_or((false, 0), |e| (e.divider, e.drawer_count()));

            let mut config_height = 0.0;
            if slot.key.slot == 0 {
                if let Some(config) = &column.config {
                    let k = config.sub_columns as usize;
                    let config_rows = config.drawer_counts.iter().copied().max().unwrap_or(0);
                    config_height = if config_rows > 0 && extra_count > 0 {
                        inner_height * f64::from(config_rows)
                            / (f64::from(config_rows) + f64::from(extra_count))
                    } else {
                        inner_height
                    };
                    for d in 1..k {
                        self.panel(
                            i,
                            format!("Sub-column divider {key}/{d}"),
                            depth,
                            config_height,
                            MaterialType::Korpus,
                        );
                    }
                    let sub_width = (inner_width - (k as f64 - 1.0) * self.t) / k as f64;
                    for sub in 0..k {
                        let count = config.drawers_in(sub);
                        if count > 0 {
                            let location = format!("{key}/{}", sub + 1);
                            self.drawers(i, &location, sub_width, config_height, count);
                        }
                    }
                }
            }

            if divider {
                self.panel(
                    i,
                    format!("Compartment divider {key}"),
                    depth,
                    inner_height,
                    MaterialType::Korpus,
                );
            }
            if extra_count > 0 {
                let height = if config_height > 0.0 && config_height < inner_height {
                    inner_height - config_height
                } else {
                    inner_height
                };
                let width = if divider {
                    (inner_width - self.t) / 2.0
                } else {
                    inner_width
                };
                self.drawers(i, &key.to_string(), width, height, extra_count);
            }
        }
    }

    /// `count` drawers stacked evenly in an opening of `width` x `height`.
    fn drawers(&mut self, column: usize, location: &str, width: f64, height: f64, count: u32) {
        let pitch = height / count as f64;
        let front_width = width - DOOR_REVEAL_GAP_CM;
        let front_height = pitch - DOOR_REVEAL_GAP_CM;
        let box_height = front_height - DRAWER_BOX_HEADROOM_CM;
        let box_depth = self.carcass_depth - DRAWER_REAR_CLEARANCE_CM;
        let box_width = width - 2.0 * DRAWER_RUNNER_CLEARANCE_CM;

        for n in 1..=count {
            let tag = format!("{location} #{n}");
            self.panel(
                column,
                format!("Drawer front {tag}"),
                front_width,
                front_height,
                MaterialType::Front,
            );
            for side in ["left", "right"] {
                self.panel(
                    column,
                    format!("Drawer side {side} {tag}"),
                    box_depth,
                    box_height,
                    MaterialType::Korpus,
                );
            }
            self.panel(
                column,
                format!("Drawer bottom {tag}"),
                box_width,
                box_depth,
                MaterialType::Korpus,
            );
        }
    }

    /// Door leaves sized to the union of their compartments, plus handles.
    fn add_doors(&mut self, materials: &'a MaterialCatalog) {
        let layout = self.layout;
        for door in &layout.doors {
            let leaves = door.door_type.leaf_count();
            if leaves == 0 {
                continue;
            }
            let span = door
                .compartments
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("+");
            let leaf_width =
                (door.bounds.width() - DOOR_REVEAL_GAP_CM * leaves as f64) / leaves as f64;
            let leaf_height = door.bounds.height() - DOOR_REVEAL_GAP_CM;

            for n in 1..=leaves {
                let description = if leaves > 1 {
                    format!("{} {n} {span}", door.door_type.label())
                } else {
                    format!("{} {span}", door.door_type.label())
                };
                self.panel(
                    door.column,
                    description,
                    leaf_width,
                    leaf_height,
                    MaterialType::Front,
                );
            }

            let Some(handle_id) = door.handle_id else {
                continue;
            };
            match materials.handle(handle_id) {
                Some(handle) => {
                    for _ in 0..leaves {
                        self.groups[door.column].push(Draft {
                            description: format!("Handle {} {span}", handle.name),
                            width: 0.0,
                            height: 0.0,
                            material_type: MaterialType::Handles,
                            material: handle,
                            per_piece: true,
                        });
                    }
                }
                None => self.warn(format!(
                    "handle {handle_id} for door {span} not in catalog; handle not listed"
                )),
            }
        }
    }

    fn finish(mut self) -> CutList {
        let mut items = Vec::new();
        let groups = std::mem::take(&mut self.groups);

        for (column, drafts) in groups.into_iter().enumerate() {
            let letter = self.layout.columns[column].letter.clone();
            for (n, draft) in drafts.into_iter().enumerate() {
                let area = if draft.per_piece {
                    0.0
                } else {
                    draft.width * draft.height / CM2_PER_M2
                };
                let raw_cost = if draft.per_piece {
                    draft.material.price
                } else {
                    area * draft.material.price
                };
                let cost = if raw_cost.is_finite() {
                    raw_cost.round() as Money
                } else {
                    self.warn(format!(
                        "{} priced at a non-finite amount; cost set to 0",
                        draft.description
                    ));
                    0
                };
                items.push(CutListItem {
                    code: format!("{letter}-{:02}", n + 1),
                    description: draft.description,
                    width: draft.width,
                    height: draft.height,
                    thickness: if draft.per_piece {
                        0.0
                    } else {
                        draft.material.thickness_mm
                    },
                    area,
                    cost,
                    element: letter.clone(),
                    material_type: draft.material_type,
                });
            }
        }

        let total_area = items.iter().map(|i| i.area).sum();
        let total_cost = items.iter().map(|i| i.cost).sum();

        CutList {
            items,
            price_per_m2: self.korpus.price,
            front_price_per_m2: self.front.price,
            back_price_per_m2: self.back.map(|b| b.price),
            total_area,
            total_cost,
            warnings: self.warnings,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
