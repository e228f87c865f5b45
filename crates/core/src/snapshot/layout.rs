//! Grid resolution: columns, slots and compartment keys.
//!
//! [`Layout::resolve`] is the single place where compartment keys are
//! derived from boundaries. The cut list calculator and the rule context
//! builder both count drawers, shelves and dividers through the resolved
//! layout, so their numbers cannot drift apart.

use std::collections::BTreeMap;

use validator::Validate;

use super::key::{element_letter, CompartmentKey};
use super::{CompartmentExtras, DoorType, ElementConfig, WardrobeSnapshot};
use crate::types::DbId;

/// Two boundaries closer than this are considered the same line.
const BOUNDARY_EPSILON_CM: f64 = 1e-6;

/// Most sub-columns one column may be split into.
pub const MAX_SUB_COLUMNS: u32 = 12;
/// Most drawers that may be stacked in one opening.
pub const MAX_DRAWERS_PER_OPENING: u32 = 40;

#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("Invalid wardrobe dimensions: {0}")]
    InvalidDimensions(#[from] validator::ValidationErrors),

    #[error("Wardrobe dimensions must be finite (width {width}, height {height}, depth {depth})")]
    NonFiniteDimension { width: f64, height: f64, depth: f64 },

    #[error("Base height {base_height} leaves no carcass within total height {height}")]
    BaseTooTall { base_height: f64, height: f64 },
}

/// Axis-aligned rectangle in carcass coordinates (cm, origin bottom-left of the body).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x0: f64,
    pub x1: f64,
    pub y0: f64,
    pub y1: f64,
}

impl Bounds {
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds {
            x0: self.x0.min(other.x0),
            x1: self.x1.max(other.x1),
            y0: self.y0.min(other.y0),
            y1: self.y1.max(other.y1),
        }
    }
}

/// One vertical cell of a column.
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    pub key: CompartmentKey,
    pub y0: f64,
    pub y1: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutColumn {
    pub index: usize,
    pub letter: String,
    pub x0: f64,
    pub x1: f64,
    /// Shelf heights, excluding the module boundary.
    pub shelves: Vec<f64>,
    pub slots: Vec<Slot>,
    /// Well-formed element config, if one was supplied.
    pub config: Option<ElementConfig>,
}

impl LayoutColumn {
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn bounds_of(&self, slot: &Slot) -> Bounds {
        Bounds {
            x0: self.x0,
            x1: self.x1,
            y0: slot.y0,
            y1: slot.y1,
        }
    }
}

/// A door group whose compartments all exist on the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct DoorPlacement {
    pub door_type: DoorType,
    /// Leftmost spanned column; the door is listed under its element letter.
    pub column: usize,
    pub compartments: Vec<CompartmentKey>,
    pub bounds: Bounds,
    pub handle_id: Option<DbId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub width: f64,
    pub depth: f64,
    /// Height of the carcass above the base.
    pub body_height: f64,
    /// Zero when the wardrobe stands without a base.
    pub base_height: f64,
    pub module_boundary: Option<f64>,
    pub columns: Vec<LayoutColumn>,
    pub extras: BTreeMap<CompartmentKey, CompartmentExtras>,
    pub doors: Vec<DoorPlacement>,
    /// Malformed entries that were skipped.
    pub warnings: Vec<String>,
}

fn is_strictly_increasing(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] < w[1])
}

/// How many parts of at least 1 cm fit along `extent_cm`, capped at `cap`.
fn fit_count(extent_cm: f64, cap: u32) -> u32 {
    if extent_cm.is_finite() && extent_cm >= 1.0 {
        extent_cm.floor().min(f64::from(cap)) as u32
    } else {
        0
    }
}

fn warn(warnings: &mut Vec<String>, message: String) {
    tracing::warn!(detail = %message, "Skipping malformed wardrobe entry");
    warnings.push(message);
}

/// Keep boundaries strictly inside `(0, limit)`, sorted and de-duplicated.
fn sanitize_boundaries(
    raw: &[f64],
    limit: f64,
    what: &str,
    warnings: &mut Vec<String>,
) -> Vec<f64> {
    debug_assert!(
        is_strictly_increasing(raw),
        "{what} boundaries must be strictly increasing: {raw:?}"
    );

    let mut kept: Vec<f64> = Vec::with_capacity(raw.len());
    for &b in raw {
        if b.is_finite() && b > BOUNDARY_EPSILON_CM && b < limit - BOUNDARY_EPSILON_CM {
            kept.push(b);
        } else {
            warn(
                warnings,
                format!("{what} boundary {b} lies outside 0..{limit} and was ignored"),
            );
        }
    }

    if !is_strictly_increasing(&kept) {
        warn(
            warnings,
            format!("{what} boundaries were not strictly increasing and have been reordered"),
        );
        kept.sort_by(f64::total_cmp);
        kept.dedup_by(|a, b| (*a - *b).abs() < BOUNDARY_EPSILON_CM);
    }
    kept
}

impl Layout {
    /// Resolve the grid of a snapshot.
    ///
    /// Fails only when the outer dimensions make the wardrobe unbuildable;
    /// individual malformed entries are dropped and listed in `warnings`.
    pub fn resolve(snapshot: &WardrobeSnapshot) -> Result<Layout, LayoutError> {
        if ![snapshot.width, snapshot.height, snapshot.depth]
            .iter()
            .all(|d| d.is_finite())
        {
            return Err(LayoutError::NonFiniteDimension {
                width: snapshot.width,
                height: snapshot.height,
                depth: snapshot.depth,
            });
        }
        snapshot.validate()?;
        let mut warnings = Vec::new();

        let base_height = if snapshot.has_base {
            if snapshot.base_height.is_finite() && snapshot.base_height > 0.0 {
                snapshot.base_height
            } else {
                warn(
                    &mut warnings,
                    format!(
                        "base enabled with non-positive height {}; treating as no base",
                        snapshot.base_height
                    ),
                );
                0.0
            }
        } else {
            0.0
        };
        let body_height = snapshot.height - base_height;
        if body_height <= 0.0 {
            return Err(LayoutError::BaseTooTall {
                base_height,
                height: snapshot.height,
            });
        }

        let module_boundary = match snapshot.module_boundary {
            Some(m) if m.is_finite() && m > 0.0 && m < body_height => Some(m),
            Some(m) => {
                warn(
                    &mut warnings,
                    format!("module boundary {m} lies outside the carcass and was ignored"),
                );
                None
            }
            None => None,
        };

        let seams = sanitize_boundaries(
            &snapshot.vertical_boundaries,
            snapshot.width,
            "vertical",
            &mut warnings,
        );
        let mut edges = Vec::with_capacity(seams.len() + 2);
        edges.push(0.0);
        edges.extend(seams);
        edges.push(snapshot.width);
        let column_count = edges.len() - 1;

        if snapshot.horizontal_boundaries.len() > column_count {
            warn(
                &mut warnings,
                format!(
                    "shelf lists given for {} columns but the grid has {column_count}; extra lists ignored",
                    snapshot.horizontal_boundaries.len()
                ),
            );
        }

        let mut columns = Vec::with_capacity(column_count);
        for index in 0..column_count {
            let raw = snapshot
                .horizontal_boundaries
                .get(index)
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            let letter = element_letter(index);
            let mut shelves = sanitize_boundaries(
                raw,
                body_height,
                &format!("column {letter} horizontal"),
                &mut warnings,
            );
            if let Some(m) = module_boundary {
                shelves.retain(|s| (s - m).abs() >= BOUNDARY_EPSILON_CM);
            }

            let mut cuts = shelves.clone();
            if let Some(m) = module_boundary {
                cuts.push(m);
                cuts.sort_by(f64::total_cmp);
            }
            let mut ys = Vec::with_capacity(cuts.len() + 2);
            ys.push(0.0);
            ys.extend(cuts);
            ys.push(body_height);

            let slots = ys
                .windows(2)
                .enumerate()
                .map(|(slot, w)| Slot {
                    key: CompartmentKey::new(index, slot),
                    y0: w[0],
                    y1: w[1],
                })
                .collect();

            columns.push(LayoutColumn {
                index,
                letter,
                x0: edges[index],
                x1: edges[index + 1],
                shelves,
                slots,
                config: None,
            });
        }

        for (raw_index, entry) in &snapshot.element_configs {
            let config = match entry.parsed() {
                Ok(config) => config,
                Err(error) => {
                    warn(
                        &mut warnings,
                        format!("element config for column {raw_index} is malformed: {error}"),
                    );
                    continue;
                }
            };
            let Ok(index) = raw_index.trim().parse::<usize>() else {
                warn(
                    &mut warnings,
                    format!("element config key {raw_index:?} is not a column index"),
                );
                continue;
            };
            let Some(column) = columns.get_mut(index) else {
                warn(
                    &mut warnings,
                    format!("element config for column {index} has no matching column"),
                );
                continue;
            };
            if config.sub_columns == 0 {
                warn(
                    &mut warnings,
                    format!("element config for column {} has zero sub-columns", column.letter),
                );
                continue;
            }
            if config.drawer_counts.len() > config.sub_columns as usize {
                warn(
                    &mut warnings,
                    format!(
                        "element config for column {} lists drawers for {} sub-columns but has {}",
                        column.letter,
                        config.drawer_counts.len(),
                        config.sub_columns
                    ),
                );
                continue;
            }
            let max_sub_columns = fit_count(column.width(), MAX_SUB_COLUMNS);
            if config.sub_columns > max_sub_columns {
                warn(
                    &mut warnings,
                    format!(
                        "element config for column {} asks for {} sub-columns but at most {max_sub_columns} fit",
                        column.letter, config.sub_columns
                    ),
                );
                continue;
            }
            let floor_height = column.slots.first().map_or(0.0, |s| s.y1 - s.y0);
            let max_drawers = fit_count(floor_height, MAX_DRAWERS_PER_OPENING);
            if config.drawer_counts.iter().any(|&n| n > max_drawers) {
                warn(
                    &mut warnings,
                    format!(
                        "element config for column {} stacks more than {max_drawers} drawers in a sub-column",
                        column.letter
                    ),
                );
                continue;
            }
            column.config = Some(config.clone());
        }

        let mut layout = Layout {
            width: snapshot.width,
            depth: snapshot.depth,
            body_height,
            base_height,
            module_boundary,
            columns,
            extras: BTreeMap::new(),
            doors: Vec::new(),
            warnings,
        };

        for (raw_key, entry) in &snapshot.compartment_extras {
            let extras = match entry.parsed() {
                Ok(extras) => extras,
                Err(error) => {
                    warn(
                        &mut layout.warnings,
                        format!("compartment extras for {raw_key} are malformed: {error}"),
                    );
                    continue;
                }
            };
            let key = match raw_key.parse::<CompartmentKey>() {
                Ok(key) => key,
                Err(e) => {
                    warn(&mut layout.warnings, format!("compartment extras skipped: {e}"));
                    continue;
                }
            };
            let Some(slot_height) = layout.slot(key).map(|s| s.y1 - s.y0) else {
                warn(
                    &mut layout.warnings,
                    format!("compartment extras for {key} refer to a compartment not on the grid"),
                );
                continue;
            };
            if layout.extras.contains_key(&key) {
                warn(
                    &mut layout.warnings,
                    format!("compartment extras for {key} given twice; {raw_key:?} ignored"),
                );
                continue;
            }

            let mut extras = extras.clone();
            let max_drawers = fit_count(slot_height, MAX_DRAWERS_PER_OPENING);
            if extras.drawer_count() > max_drawers {
                warn(
                    &mut layout.warnings,
                    format!(
                        "compartment {key} asks for {} drawers but at most {max_drawers} fit; drawers dropped",
                        extras.drawers_count
                    ),
                );
                extras.drawers = false;
                extras.drawers_count = 0;
            }
            layout.extras.insert(key, extras);
        }

        for (position, entry) in snapshot.door_groups.iter().enumerate() {
            let group = match entry.parsed() {
                Ok(group) => group,
                Err(error) => {
                    warn(
                        &mut layout.warnings,
                        format!("door group #{} is malformed: {error}", position + 1),
                    );
                    continue;
                }
            };
            let label = group
                .id
                .clone()
                .unwrap_or_else(|| format!("#{}", position + 1));
            match group.door_type {
                DoorType::None => continue,
                DoorType::Unknown => {
                    warn(
                        &mut layout.warnings,
                        format!("door group {label} has an unknown door type"),
                    );
                    continue;
                }
                _ => {}
            }
            match layout.span_bounds(&group.compartments) {
                Some(bounds) => {
                    let column = group
                        .compartments
                        .iter()
                        .map(|k| k.column)
                        .min()
                        .unwrap_or(0);
                    layout.doors.push(DoorPlacement {
                        door_type: group.door_type,
                        column,
                        compartments: group.compartments.clone(),
                        bounds,
                        handle_id: group.handle_id,
                    });
                }
                None => warn(
                    &mut layout.warnings,
                    format!("door group {label} spans no compartments on the grid"),
                ),
            }
        }

        Ok(layout)
    }

    pub fn slot(&self, key: CompartmentKey) -> Option<&Slot> {
        self.columns.get(key.column)?.slots.get(key.slot)
    }

    /// Outer bounds of one compartment.
    pub fn bounds(&self, key: CompartmentKey) -> Option<Bounds> {
        let column = self.columns.get(key.column)?;
        let slot = column.slots.get(key.slot)?;
        Some(column.bounds_of(slot))
    }

    /// Union of the bounds of all keys; `None` if empty or any key is off the grid.
    pub fn span_bounds(&self, keys: &[CompartmentKey]) -> Option<Bounds> {
        let mut iter = keys.iter();
        let mut acc = self.bounds(*iter.next()?)?;
        for key in iter {
            acc = acc.union(&self.bounds(*key)?);
        }
        Some(acc)
    }

    pub fn is_module_boundary(&self, y: f64) -> bool {
        self.module_boundary
            .is_some_and(|m| (m - y).abs() < BOUNDARY_EPSILON_CM)
    }

    /// Height ranges of the stacked modules (one, or two when split).
    pub fn modules(&self) -> Vec<(f64, f64)> {
        match self.module_boundary {
            Some(m) => vec![(0.0, m), (m, self.body_height)],
            None => vec![(0.0, self.body_height)],
        }
    }

    /// Per-sub-column drawers plus whole-compartment drawers.
    pub fn drawer_count(&self) -> u32 {
        let configured = self
            .columns
            .iter()
            .filter_map(|c| c.config.as_ref())
            .map(ElementConfig::drawer_total);
        let extra = self.extras.values().map(CompartmentExtras::drawer_count);
        configured
            .chain(extra)
            .fold(0, |total: u32, n| total.saturating_add(n))
    }

    /// Shelves of the bottom and top modules together.
    pub fn shelf_count(&self) -> u32 {
        self.columns.iter().map(|c| c.shelves.len() as u32).sum()
    }

    pub fn rod_count(&self) -> u32 {
        self.extras.values().filter(|e| e.rod).count() as u32
    }

    pub fn led_count(&self) -> u32 {
        self.extras.values().filter(|e| e.led).count() as u32
    }

    /// Compartments split by a divider.
    pub fn compartment_divider_count(&self) -> u32 {
        self.extras.values().filter(|e| e.divider).count() as u32
    }

    /// Columns whose element config splits them into more than one sub-column.
    pub fn vertical_divider_count(&self) -> u32 {
        self.columns
            .iter()
            .filter_map(|c| c.config.as_ref())
            .filter(|cfg| cfg.sub_columns > 1)
            .count() as u32
    }
}
