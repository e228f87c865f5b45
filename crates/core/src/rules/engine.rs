//! Rule application: ordered rules in, ordered adjustments out.

use serde_json::Value;

use super::condition::conditions_match;
use super::model::{ActionSpec, Adjustment, PercentageBasis, PricingRule, RuleAction};
use crate::rule_context::RuleContext;

/// Apply every enabled rule whose conditions match, in ascending
/// `(priority, created_at)` order. Ties keep their input order.
///
/// Each applied action yields one [`Adjustment`]. A discount that would
/// take the running total below zero is clamped to land exactly on zero;
/// later additive actions still apply on top.
pub fn apply_rules(rules: &[PricingRule], context: &RuleContext, base_total: f64) -> Vec<Adjustment> {
    if !base_total.is_finite() {
        tracing::warn!(base_total, "Non-finite base total; no rules applied");
        return Vec::new();
    }

    let fields = match serde_json::to_value(context) {
        Ok(fields) => fields,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to serialize rule context");
            Value::Null
        }
    };

    let mut ordered: Vec<&PricingRule> = rules.iter().filter(|r| r.enabled).collect();
    ordered.sort_by_key(|r| (r.priority, r.created_at));

    let mut adjustments = Vec::new();
    let mut running = base_total;

    for rule in ordered {
        if !conditions_match(&rule.conditions, &fields) {
            continue;
        }
        tracing::debug!(rule_id = rule.id, rule = %rule.name, "Pricing rule matched");

        for (position, spec) in rule.actions.iter().enumerate() {
            let action = match spec {
                ActionSpec::Known(action) => action,
                ActionSpec::Malformed(raw) => {
                    tracing::warn!(rule_id = rule.id, position, action = %raw, "Skipping malformed rule action");
                    continue;
                }
            };
            let (mut amount, description) = match action_amount(action, running, base_total) {
                Ok(priced) => priced,
                Err(reason) => {
                    tracing::warn!(rule_id = rule.id, position, reason, "Skipping invalid rule action");
                    continue;
                }
            };
            if amount < 0.0 && running + amount < 0.0 {
                amount = -running.max(0.0);
            }
            running += amount;

            adjustments.push(Adjustment {
                rule_id: rule.id,
                rule_name: rule.name.clone(),
                action_type: action.action_type().to_string(),
                description,
                amount,
                visible: action.is_visible(),
            });
        }
    }

    adjustments
}

/// Signed amount and description of one action, or why it cannot apply.
fn action_amount(
    action: &RuleAction,
    running: f64,
    original: f64,
) -> Result<(f64, String), &'static str> {
    let basis_of = |basis: PercentageBasis| match basis {
        PercentageBasis::Running => running,
        PercentageBasis::Original => original,
    };

    match action {
        RuleAction::AddItem { name, price, quantity, .. } => {
            non_negative(*price)?;
            if !quantity.is_finite() || *quantity <= 0.0 {
                return Err("quantity must be positive");
            }
            let description = if *quantity == 1.0 {
                name.clone()
            } else {
                format!("{name} x {quantity}")
            };
            Ok((price * quantity, description))
        }
        RuleAction::DiscountPercentage { percentage, basis, .. } => {
            non_negative(*percentage)?;
            Ok((-percentage / 100.0 * basis_of(*basis), format!("{percentage}% discount")))
        }
        RuleAction::SurchargePercentage { percentage, basis, .. } => {
            non_negative(*percentage)?;
            Ok((percentage / 100.0 * basis_of(*basis), format!("{percentage}% surcharge")))
        }
        RuleAction::DiscountFixed { amount, .. } => {
            non_negative(*amount)?;
            Ok((-amount, "Discount".to_string()))
        }
        RuleAction::SurchargeFixed { amount, .. } => {
            non_negative(*amount)?;
            Ok((*amount, "Surcharge".to_string()))
        }
    }
}

fn non_negative(value: f64) -> Result<(), &'static str> {
    if !value.is_finite() {
        Err("amount is not a finite number")
    } else if value < 0.0 {
        Err("amount is negative")
    } else {
        Ok(())
    }
}

/// Base total plus every adjustment, visible or not. Never negative, never NaN.
pub fn calculate_final_price(base_total: f64, adjustments: &[Adjustment]) -> f64 {
    let sum: f64 = adjustments
        .iter()
        .map(|a| a.amount)
        .filter(|a| a.is_finite())
        .sum();
    let total = base_total + sum;
    if total.is_finite() {
        total.max(0.0)
    } else {
        0.0
    }
}

/// Customer-facing adjustments, in application order.
pub fn get_visible_adjustments(adjustments: &[Adjustment]) -> Vec<Adjustment> {
    adjustments.iter().filter(|a| a.visible).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::model::{ConditionOperator, LogicOperator, RuleCondition};
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn rule(id: i64, priority: i32, actions: Vec<serde_json::Value>) -> PricingRule {
        PricingRule {
            id,
            name: format!("Rule {id}"),
            enabled: true,
            priority,
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            conditions: Vec::new(),
            actions: actions
                .into_iter()
                .map(|a| serde_json::from_value(a).unwrap())
                .collect(),
        }
    }

    fn area_over(limit: f64) -> RuleCondition {
        RuleCondition {
            field: "wardrobe.area".into(),
            operator: ConditionOperator::GreaterThan,
            value: json!(limit),
            logic_operator: LogicOperator::And,
        }
    }

    fn context(area: f64) -> RuleContext {
        let mut ctx = RuleContext::default();
        ctx.wardrobe.area = area;
        ctx
    }

    fn amounts(adjustments: &[Adjustment]) -> Vec<f64> {
        adjustments.iter().map(|a| a.amount).collect()
    }

    #[test]
    fn area_discount_then_fixed_surcharge() {
        let mut a = rule(1, 1, vec![json!({ "type": "discount_percentage", "percentage": 10 })]);
        a.conditions.push(area_over(2.0));
        let b = rule(2, 2, vec![json!({ "type": "surcharge_fixed", "amount": 500 })]);

        let adjustments = apply_rules(&[b, a], &context(2.5), 10_000.0);
        assert_eq!(amounts(&adjustments), vec![-1000.0, 500.0]);
        assert_eq!(calculate_final_price(10_000.0, &adjustments), 9500.0);
    }

    #[test]
    fn unmatched_conditions_skip_the_rule() {
        let mut a = rule(1, 1, vec![json!({ "type": "discount_percentage", "percentage": 10 })]);
        a.conditions.push(area_over(2.0));
        assert!(apply_rules(&[a], &context(1.5), 10_000.0).is_empty());
    }

    #[test]
    fn disabled_rules_never_apply() {
        let mut a = rule(1, 1, vec![json!({ "type": "surcharge_fixed", "amount": 100 })]);
        a.enabled = false;
        assert!(apply_rules(&[a], &context(1.0), 1000.0).is_empty());
    }

    #[test]
    fn running_basis_sees_earlier_rules() {
        let first = rule(1, 10, vec![json!({ "type": "surcharge_percentage", "percentage": 10 })]);
        let second = rule(2, 20, vec![json!({ "type": "discount_percentage", "percentage": 10 })]);
        let adjustments = apply_rules(&[second, first], &context(1.0), 10_000.0);
        assert_eq!(amounts(&adjustments), vec![1000.0, -1100.0]);
    }

    #[test]
    fn original_basis_ignores_earlier_rules() {
        let first = rule(1, 10, vec![json!({ "type": "surcharge_percentage", "percentage": 10 })]);
        let second = rule(
            2,
            20,
            vec![json!({ "type": "discount_percentage", "percentage": 10, "basis": "original" })],
        );
        let adjustments = apply_rules(&[first, second], &context(1.0), 10_000.0);
        assert_eq!(amounts(&adjustments), vec![1000.0, -1000.0]);
    }

    #[test]
    fn equal_priority_falls_back_to_creation_time_then_input_order() {
        let mut late = rule(1, 5, vec![json!({ "type": "add_item", "name": "Late", "price": 1 })]);
        late.created_at = Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap();
        let early_a = rule(2, 5, vec![json!({ "type": "add_item", "name": "A", "price": 1 })]);
        let early_b = rule(3, 5, vec![json!({ "type": "add_item", "name": "B", "price": 1 })]);

        let adjustments = apply_rules(&[late, early_a, early_b], &context(1.0), 0.0);
        let ids: Vec<i64> = adjustments.iter().map(|a| a.rule_id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn discount_floor_is_per_rule_and_later_additions_still_count() {
        let big = rule(1, 1, vec![json!({ "type": "discount_fixed", "amount": 5000 })]);
        let fee = rule(2, 2, vec![json!({ "type": "add_item", "name": "Delivery", "price": 300 })]);

        let adjustments = apply_rules(&[big, fee], &context(1.0), 1000.0);
        assert_eq!(amounts(&adjustments), vec![-1000.0, 300.0]);
        assert_eq!(calculate_final_price(1000.0, &adjustments), 300.0);
    }

    #[test]
    fn final_price_is_never_negative() {
        let adjustment = Adjustment {
            rule_id: 1,
            rule_name: "Manual".into(),
            action_type: "discount_fixed".into(),
            description: "Discount".into(),
            amount: -5000.0,
            visible: true,
        };
        assert_eq!(calculate_final_price(1000.0, &[adjustment.clone()]), 0.0);

        let nan = Adjustment { amount: f64::NAN, ..adjustment };
        assert_eq!(calculate_final_price(1000.0, &[nan]), 1000.0);
    }

    #[test]
    fn internal_actions_are_hidden_but_still_priced() {
        let r = rule(
            1,
            1,
            vec![
                json!({ "type": "add_item", "name": "Assembly", "price": 2000 }),
                json!({ "type": "surcharge_fixed", "amount": 700, "internal": true }),
                json!({ "type": "discount_fixed", "amount": 100 }),
            ],
        );
        let adjustments = apply_rules(&[r], &context(1.0), 10_000.0);
        let visible = get_visible_adjustments(&adjustments);
        assert_eq!(amounts(&visible), vec![2000.0, -100.0]);
        assert_eq!(calculate_final_price(10_000.0, &adjustments), 12_600.0);
    }

    #[test]
    fn malformed_actions_are_skipped_and_siblings_run() {
        let r = rule(
            1,
            1,
            vec![
                json!({ "type": "free_shipping" }),
                json!({ "type": "surcharge_fixed", "amount": -50 }),
                json!({ "type": "add_item", "name": "Rod", "price": 900, "quantity": 0 }),
                json!({ "type": "add_item", "name": "LED strip", "price": 1500, "quantity": 2 }),
            ],
        );
        let adjustments = apply_rules(&[r], &context(1.0), 0.0);
        assert_eq!(adjustments.len(), 1);
        assert_eq!(adjustments[0].amount, 3000.0);
        assert_eq!(adjustments[0].description, "LED strip x 2");
    }

    #[test]
    fn adjustments_carry_rule_identity() {
        let r = rule(9, 1, vec![json!({ "type": "discount_percentage", "percentage": 5 })]);
        let adjustments = apply_rules(&[r], &context(1.0), 2000.0);
        assert_eq!(adjustments[0].rule_id, 9);
        assert_eq!(adjustments[0].rule_name, "Rule 9");
        assert_eq!(adjustments[0].action_type, "discount_percentage");
        assert_eq!(adjustments[0].description, "5% discount");
        assert!(adjustments[0].visible);
    }

    #[test]
    fn non_finite_base_applies_nothing() {
        let r = rule(1, 1, vec![json!({ "type": "surcharge_fixed", "amount": 1 })]);
        assert!(apply_rules(&[r], &context(1.0), f64::NAN).is_empty());
    }
}
