//! Pricing rule records and the adjustments they produce.

use serde::{Deserialize, Serialize};

use crate::types::{DbId, Timestamp};

fn default_enabled() -> bool {
    true
}

fn default_quantity() -> f64 {
    1.0
}

/// A business rule: when its conditions match, its actions adjust the price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingRule {
    pub id: DbId,
    pub name: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Lower values are evaluated first.
    #[serde(default)]
    pub priority: i32,
    pub created_at: Timestamp,
    #[serde(default)]
    pub conditions: Vec<RuleCondition>,
    #[serde(default)]
    pub actions: Vec<ActionSpec>,
}

/// One comparison against a dotted context path such as `wardrobe.area`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleCondition {
    pub field: String,
    pub operator: ConditionOperator,
    #[serde(default)]
    pub value: serde_json::Value,
    /// Joins this condition's result with the next one.
    #[serde(default)]
    pub logic_operator: LogicOperator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
    #[serde(alias = "eq", alias = "==")]
    Equals,
    #[serde(alias = "ne", alias = "!=")]
    NotEquals,
    #[serde(alias = "gt", alias = ">")]
    GreaterThan,
    #[serde(alias = "gte", alias = ">=")]
    GreaterThanOrEqual,
    #[serde(alias = "lt", alias = "<")]
    LessThan,
    #[serde(alias = "lte", alias = "<=")]
    LessThanOrEqual,
    Contains,
    NotContains,
    In,
    NotIn,
    IsEmpty,
    IsNotEmpty,
    Matches,
    /// Anything else; never matches.
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogicOperator {
    #[default]
    #[serde(alias = "and")]
    And,
    #[serde(alias = "or")]
    Or,
}

impl LogicOperator {
    pub fn combine(self, left: bool, right: bool) -> bool {
        match self {
            Self::And => left && right,
            Self::Or => left || right,
        }
    }
}

/// What a percentage action is computed against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PercentageBasis {
    /// The running total after all previously applied actions.
    #[default]
    Running,
    /// The base total before any rule ran.
    Original,
}

/// A well-formed rule action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuleAction {
    AddItem {
        name: String,
        price: f64,
        #[serde(default = "default_quantity")]
        quantity: f64,
        #[serde(default)]
        internal: bool,
    },
    DiscountPercentage {
        percentage: f64,
        #[serde(default)]
        basis: PercentageBasis,
        #[serde(default)]
        internal: bool,
    },
    SurchargePercentage {
        percentage: f64,
        #[serde(default)]
        basis: PercentageBasis,
        #[serde(default)]
        internal: bool,
    },
    DiscountFixed {
        amount: f64,
        #[serde(default)]
        internal: bool,
    },
    SurchargeFixed {
        amount: f64,
        #[serde(default)]
        internal: bool,
    },
}

impl RuleAction {
    pub fn action_type(&self) -> &'static str {
        match self {
            Self::AddItem { .. } => "add_item",
            Self::DiscountPercentage { .. } => "discount_percentage",
            Self::SurchargePercentage { .. } => "surcharge_percentage",
            Self::DiscountFixed { .. } => "discount_fixed",
            Self::SurchargeFixed { .. } => "surcharge_fixed",
        }
    }

    /// Customer-facing unless marked internal.
    pub fn is_visible(&self) -> bool {
        let internal = match self {
            Self::AddItem { internal, .. }
            | Self::DiscountPercentage { internal, .. }
            | Self::SurchargePercentage { internal, .. }
            | Self::DiscountFixed { internal, .. }
            | Self::SurchargeFixed { internal, .. } => *internal,
        };
        !internal
    }
}

/// An action entry as stored. Entries that do not parse are kept verbatim so
/// they survive a round trip and can be skipped at evaluation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActionSpec {
    Known(RuleAction),
    Malformed(serde_json::Value),
}

/// One price change produced by an applied action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Adjustment {
    pub rule_id: DbId,
    pub rule_name: String,
    pub action_type: String,
    pub description: String,
    /// Signed: negative for discounts.
    pub amount: f64,
    pub visible: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    #[test]
    fn rule_defaults_fill_missing_fields() {
        let rule: PricingRule = serde_json::from_value(json!({
            "id": 7,
            "name": "Spring sale",
            "created_at": "2026-03-01T00:00:00Z"
        }))
        .unwrap();
        assert!(rule.enabled);
        assert_eq!(rule.priority, 0);
        assert!(rule.conditions.is_empty());
        assert!(rule.actions.is_empty());
    }

    #[test]
    fn actions_parse_by_type_tag() {
        let spec: ActionSpec = serde_json::from_value(json!({
            "type": "discount_percentage", "percentage": 10.0, "basis": "original"
        }))
        .unwrap();
        assert_matches!(
            spec,
            ActionSpec::Known(RuleAction::DiscountPercentage {
                basis: PercentageBasis::Original,
                internal: false,
                ..
            })
        );

        let spec: ActionSpec = serde_json::from_value(json!({
            "type": "add_item", "name": "Assembly", "price": 2500.0
        }))
        .unwrap();
        assert_matches!(spec, ActionSpec::Known(RuleAction::AddItem { quantity, .. }) if quantity == 1.0);
    }

    #[test]
    fn unparseable_actions_are_preserved() {
        for raw in [
            json!({ "type": "free_shipping" }),
            json!({ "type": "surcharge_fixed" }),
            json!("discount"),
        ] {
            let spec: ActionSpec = serde_json::from_value(raw.clone()).unwrap();
            assert_eq!(spec, ActionSpec::Malformed(raw.clone()));
            assert_eq!(serde_json::to_value(&spec).unwrap(), raw);
        }
    }

    #[test]
    fn operators_accept_symbolic_aliases() {
        let op: ConditionOperator = serde_json::from_value(json!(">=")).unwrap();
        assert_eq!(op, ConditionOperator::GreaterThanOrEqual);
        let op: ConditionOperator = serde_json::from_value(json!("between")).unwrap();
        assert_eq!(op, ConditionOperator::Unknown);
    }

    #[test]
    fn logic_operator_accepts_either_case() {
        let c: RuleCondition = serde_json::from_value(json!({
            "field": "wardrobe.area", "operator": "gt", "value": 2, "logic_operator": "or"
        }))
        .unwrap();
        assert_eq!(c.logic_operator, LogicOperator::Or);
        let c: RuleCondition =
            serde_json::from_value(json!({ "field": "x", "operator": "is_empty" })).unwrap();
        assert_eq!(c.logic_operator, LogicOperator::And);
        assert!(c.value.is_null());
    }
}
