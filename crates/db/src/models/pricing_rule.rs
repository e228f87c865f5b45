//! `pricing_rules` rows.
//!
//! Conditions and actions are stored as JSONB authored by administrators.
//! A rule whose conditions cannot be parsed is loaded disabled; individual
//! action entries that do not parse are kept as malformed and skipped by
//! the engine.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use wardrobe_core::rules::{ActionSpec, PricingRule, RuleCondition};
use wardrobe_core::types::{DbId, Timestamp};

/// A pricing_rules row from the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PricingRuleRow {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub enabled: bool,
    pub priority: i32,
    pub conditions: serde_json::Value,
    pub actions: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<PricingRuleRow> for PricingRule {
    fn from(row: PricingRuleRow) -> Self {
        let mut enabled = row.enabled;

        let conditions = match serde_json::from_value::<Vec<RuleCondition>>(row.conditions) {
            Ok(conditions) => conditions,
            Err(e) => {
                tracing::warn!(rule_id = row.id, error = %e, "Unparseable rule conditions; rule disabled");
                enabled = false;
                Vec::new()
            }
        };

        let actions = match row.actions {
            serde_json::Value::Array(entries) => entries
                .into_iter()
                .map(|entry| {
                    serde_json::from_value::<ActionSpec>(entry.clone())
                        .unwrap_or(ActionSpec::Malformed(entry))
                })
                .collect(),
            other => {
                tracing::warn!(rule_id = row.id, actions = %other, "Rule actions are not a list; rule disabled");
                enabled = false;
                Vec::new()
            }
        };

        PricingRule {
            id: row.id,
            name: row.name,
            enabled,
            priority: row.priority,
            created_at: row.created_at,
            conditions,
            actions,
        }
    }
}
