//! Pricing rules engine.
//!
//! A pure function of (rules, context, base total). No state survives an
//! evaluation and rule data can never make it fail.

pub mod condition;
pub mod engine;
pub mod model;

pub use engine::{apply_rules, calculate_final_price, get_visible_adjustments};
pub use model::{
    ActionSpec, Adjustment, ConditionOperator, LogicOperator, PercentageBasis, PricingRule,
    RuleAction, RuleCondition,
};
