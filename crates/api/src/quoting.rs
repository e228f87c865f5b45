//! Loading pricing inputs and producing quotes.
//!
//! Price preview and order creation both go through [`quote`], so the price
//! a customer sees is the price the order is created with.

use serde::Serialize;
use wardrobe_core::cut_list::{compute_cut_list, CutList};
use wardrobe_core::error::CoreError;
use wardrobe_core::material::{HandleCatalog, Material, MaterialCatalog};
use wardrobe_core::pricing::{quote_wardrobe, PriceQuote, PricingInputs};
use wardrobe_core::rule_context::Customer;
use wardrobe_core::rules::PricingRule;
use wardrobe_core::snapshot::WardrobeSnapshot;
use wardrobe_core::types::DbId;
use wardrobe_db::repositories::{CustomerRepo, MaterialRepo, OrderRepo, PricingRuleRepo};
use wardrobe_db::DbPool;

use crate::error::{AppError, AppResult};

/// Who is buying and where it goes.
#[derive(Debug, Clone, Default)]
pub struct QuoteRequest {
    pub customer_id: Option<DbId>,
    pub destination: Option<String>,
}

pub async fn load_catalog(pool: &DbPool) -> AppResult<MaterialCatalog> {
    let rows = MaterialRepo::list_all(pool).await?;
    Ok(MaterialCatalog::new(rows.into_iter().map(Material::from)))
}

/// Cut list estimate for a saved design; `None` while it is not priceable.
pub async fn estimate(pool: &DbPool, snapshot: &WardrobeSnapshot) -> AppResult<Option<CutList>> {
    let materials = load_catalog(pool).await?;
    Ok(compute_cut_list(snapshot, &materials))
}

/// Full quote: catalog, enabled rules, customer history, then the pure core.
pub async fn quote(
    pool: &DbPool,
    snapshot: &WardrobeSnapshot,
    request: &QuoteRequest,
) -> AppResult<Option<PriceQuote>> {
    let materials = load_catalog(pool).await?;
    let handles = HandleCatalog::from_materials(&materials);
    let rules: Vec<PricingRule> = PricingRuleRepo::list_enabled(pool)
        .await?
        .into_iter()
        .map(PricingRule::from)
        .collect();

    let (customer, prior_order_count) = match request.customer_id {
        Some(id) => {
            let customer: Customer = CustomerRepo::find_by_id(pool, id)
                .await?
                .ok_or(CoreError::NotFound {
                    entity: "Customer",
                    id,
                })?
                .into();
            let count = OrderRepo::count_for_customer(pool, id).await?;
            (Some(customer), u32::try_from(count).unwrap_or(u32::MAX))
        }
        None => (None, 0),
    };

    let inputs = PricingInputs {
        materials: &materials,
        handles: &handles,
        rules: &rules,
        customer: customer.as_ref(),
        prior_order_count,
        destination: request.destination.as_deref(),
    };
    let quote = quote_wardrobe(snapshot, inputs);

    match &quote {
        Some(q) => tracing::debug!(
            base_total = q.base_total,
            final_price = q.final_price,
            adjustments = q.adjustments.len(),
            "Wardrobe quoted"
        ),
        None => tracing::debug!("Wardrobe not priceable"),
    }
    Ok(quote)
}

/// Serialize a value for a JSONB column.
pub fn to_json<T: Serialize>(value: &T) -> AppResult<serde_json::Value> {
    serde_json::to_value(value).map_err(|e| AppError::InternalError(e.to_string()))
}
