//! Quote composition shared by price preview and order creation.

use serde::{Deserialize, Serialize};

use crate::cut_list::{compute_cut_list, CutList};
use crate::material::{HandleCatalog, MaterialCatalog};
use crate::rule_context::{build_rule_context, Customer, OrderInfo};
use crate::rules::{
    apply_rules, calculate_final_price, get_visible_adjustments, Adjustment, PricingRule,
};
use crate::snapshot::WardrobeSnapshot;

/// Everything besides the snapshot that a quote depends on.
#[derive(Debug, Clone, Copy)]
pub struct PricingInputs<'a> {
    pub materials: &'a MaterialCatalog,
    pub handles: &'a HandleCatalog,
    pub rules: &'a [PricingRule],
    pub customer: Option<&'a Customer>,
    pub prior_order_count: u32,
    pub destination: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub cut_list: CutList,
    pub base_total: f64,
    /// All adjustments, internal ones included.
    pub adjustments: Vec<Adjustment>,
    pub final_price: f64,
}

impl PriceQuote {
    pub fn visible_adjustments(&self) -> Vec<Adjustment> {
        get_visible_adjustments(&self.adjustments)
    }
}

/// Cut list cost as the base, rules on top. `None` when the wardrobe is not
/// yet priceable.
pub fn quote_wardrobe(snapshot: &WardrobeSnapshot, inputs: PricingInputs<'_>) -> Option<PriceQuote> {
    let cut_list = compute_cut_list(snapshot, inputs.materials)?;
    let base_total = cut_list.total_cost as f64;

    let context = build_rule_context(
        snapshot,
        inputs.handles,
        inputs.customer,
        inputs.prior_order_count,
        OrderInfo {
            total: base_total,
            destination: inputs.destination.map(str::to_string),
        },
    );
    let adjustments = apply_rules(inputs.rules, &context, base_total);
    let final_price = calculate_final_price(base_total, &adjustments);

    Some(PriceQuote {
        cut_list,
        base_total,
        adjustments,
        final_price,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::{Material, MaterialType};
    use chrono::Utc;
    use serde_json::json;

    fn materials() -> MaterialCatalog {
        MaterialCatalog::new([
            Material {
                id: 1,
                name: "Oak korpus".into(),
                price: 2500.0,
                thickness_mm: 18.0,
                categories: vec![MaterialType::Korpus],
                stock: 10,
                finish: None,
            },
            Material {
                id: 2,
                name: "Chrome bar".into(),
                price: 450.0,
                thickness_mm: 0.0,
                categories: vec![MaterialType::Handles],
                stock: 10,
                finish: Some("Chrome".into()),
            },
        ])
    }

    fn snapshot() -> WardrobeSnapshot {
        serde_json::from_value(json!({
            "width": 200.0, "height": 220.0, "depth": 60.0,
            "korpus_material_id": 1,
            "vertical_boundaries": [100.0],
            "door_groups": [
                { "type": "double", "compartments": ["A1"], "handle_id": 2 },
                { "type": "double", "compartments": ["B1"], "handle_id": 2 }
            ]
        }))
        .unwrap()
    }

    fn rules() -> Vec<PricingRule> {
        serde_json::from_value(json!([
            {
                "id": 1, "name": "Chrome doubles", "priority": 1,
                "created_at": Utc::now(),
                "conditions": [
                    { "field": "wardrobe.door_type_finishes.double.chrome", "operator": "greater_than", "value": 1 }
                ],
                "actions": [{ "type": "discount_percentage", "percentage": 10 }]
            },
            {
                "id": 2, "name": "Delivery", "priority": 2,
                "created_at": Utc::now(),
                "conditions": [{ "field": "order.destination", "operator": "equals", "value": "novi sad" }],
                "actions": [
                    { "type": "add_item", "name": "Delivery", "price": 1500 },
                    { "type": "surcharge_fixed", "amount": 200, "internal": true }
                ]
            }
        ]))
        .unwrap()
    }

    fn inputs<'a>(
        materials: &'a MaterialCatalog,
        handles: &'a HandleCatalog,
        rules: &'a [PricingRule],
    ) -> PricingInputs<'a> {
        PricingInputs {
            materials,
            handles,
            rules,
            customer: None,
            prior_order_count: 0,
            destination: Some("Novi Sad"),
        }
    }

    #[test]
    fn quote_combines_cut_list_and_rules() {
        let materials = materials();
        let handles = HandleCatalog::from_materials(&materials);
        let rules = rules();
        let quote = quote_wardrobe(&snapshot(), inputs(&materials, &handles, &rules)).unwrap();

        assert_eq!(quote.base_total, quote.cut_list.total_cost as f64);
        assert_eq!(quote.adjustments.len(), 3);
        let expected = quote.base_total * 0.9 + 1500.0 + 200.0;
        assert!((quote.final_price - expected).abs() < 1e-6);

        let visible = quote.visible_adjustments();
        assert_eq!(visible.len(), 2);
        assert_eq!(visible[1].description, "Delivery");
    }

    #[test]
    fn unpriceable_wardrobe_has_no_quote() {
        let materials = materials();
        let handles = HandleCatalog::from_materials(&materials);
        let mut s = snapshot();
        s.korpus_material_id = None;
        assert!(quote_wardrobe(&s, inputs(&materials, &handles, &[])).is_none());
    }

    #[test]
    fn quoting_twice_agrees() {
        let materials = materials();
        let handles = HandleCatalog::from_materials(&materials);
        let rules = rules();
        let a = quote_wardrobe(&snapshot(), inputs(&materials, &handles, &rules));
        let b = quote_wardrobe(&snapshot(), inputs(&materials, &handles, &rules));
        assert_eq!(a, b);
    }

    #[test]
    fn malformed_entries_still_quote_with_warnings() {
        let materials = materials();
        let handles = HandleCatalog::from_materials(&materials);
        let mut value = serde_json::to_value(snapshot()).unwrap();
        value["compartment_extras"] = json!({ "1A": { "rod": true }, "B1": { "rod": "yes" } });
        let s: WardrobeSnapshot = serde_json::from_value(value).unwrap();

        let quote = quote_wardrobe(&s, inputs(&materials, &handles, &[])).unwrap();
        assert!(quote.base_total > 0.0);
        assert_eq!(quote.cut_list.warnings.len(), 2);
    }
}
