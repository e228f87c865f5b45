//! Order placement and lookup.
//!
//! An order freezes the snapshot, cut list and every adjustment at the
//! moment it is placed. Catalog or rule changes never touch it afterwards.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use wardrobe_core::error::CoreError;
use wardrobe_core::rules::{get_visible_adjustments, Adjustment};
use wardrobe_core::snapshot::WardrobeSnapshot;
use wardrobe_core::types::{DbId, Timestamp};
use wardrobe_db::models::order::{CreateOrder, Order};
use wardrobe_db::repositories::{OrderRepo, WardrobeRepo};

use crate::error::{AppError, AppResult};
use crate::quoting::{quote, to_json, QuoteRequest};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub wardrobe_id: DbId,
    pub destination: Option<String>,
}

/// An order as shown to the customer: internal adjustments are left out.
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: DbId,
    pub reference: uuid::Uuid,
    pub wardrobe_id: Option<DbId>,
    pub customer_id: Option<DbId>,
    pub destination: Option<String>,
    pub cut_list: serde_json::Value,
    pub adjustments: Vec<Adjustment>,
    pub base_total: f64,
    pub final_price: f64,
    pub status: String,
    pub created_at: Timestamp,
}

impl TryFrom<Order> for OrderResponse {
    type Error = AppError;

    fn try_from(order: Order) -> Result<Self, Self::Error> {
        let adjustments: Vec<Adjustment> = serde_json::from_value(order.adjustments)
            .map_err(|e| {
                CoreError::Internal(format!("order {} has unreadable adjustments: {e}", order.id))
            })?;
        Ok(Self {
            id: order.id,
            reference: order.reference,
            wardrobe_id: order.wardrobe_id,
            customer_id: order.customer_id,
            destination: order.destination,
            cut_list: order.cut_list,
            adjustments: get_visible_adjustments(&adjustments),
            base_total: order.base_total,
            final_price: order.final_price,
            status: order.status,
            created_at: order.created_at,
        })
    }
}

// ---------------------------------------------------------------------------
// POST /orders
// ---------------------------------------------------------------------------

/// Price a saved wardrobe through the same quoting path as the preview and
/// freeze the result.
pub async fn create_order(
    State(state): State<AppState>,
    Json(body): Json<CreateOrderRequest>,
) -> AppResult<impl IntoResponse> {
    let wardrobe = WardrobeRepo::find_by_id(&state.pool, body.wardrobe_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Wardrobe",
            id: body.wardrobe_id,
        })?;
    let snapshot: WardrobeSnapshot =
        serde_json::from_value(wardrobe.snapshot.clone()).map_err(|e| {
            CoreError::Internal(format!("wardrobe {} has an unreadable snapshot: {e}", wardrobe.id))
        })?;

    let request = QuoteRequest {
        customer_id: wardrobe.customer_id,
        destination: body.destination.clone(),
    };
    let quote = quote(&state.pool, &snapshot, &request).await?.ok_or_else(|| {
        CoreError::Validation(
            "Wardrobe is not priceable yet: choose a korpus material and valid dimensions".into(),
        )
    })?;

    let input = CreateOrder {
        wardrobe_id: Some(wardrobe.id),
        customer_id: wardrobe.customer_id,
        destination: body.destination,
        snapshot: wardrobe.snapshot,
        cut_list: to_json(&quote.cut_list)?,
        adjustments: to_json(&quote.adjustments)?,
        base_total: quote.base_total,
        final_price: quote.final_price,
    };
    let order = OrderRepo::create(&state.pool, &input).await?;

    tracing::info!(
        order_id = order.id,
        reference = %order.reference,
        wardrobe_id = wardrobe.id,
        final_price = order.final_price,
        "Order placed"
    );
    let response = OrderResponse::try_from(order)?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: response })))
}

// ---------------------------------------------------------------------------
// GET /orders/{id}
// ---------------------------------------------------------------------------

pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let order = OrderRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound { entity: "Order", id })?;
    Ok(Json(DataResponse {
        data: OrderResponse::try_from(order)?,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::Utc;
    use serde_json::json;

    fn order(adjustments: serde_json::Value) -> Order {
        Order {
            id: 5,
            reference: uuid::Uuid::now_v7(),
            wardrobe_id: Some(2),
            customer_id: None,
            destination: None,
            snapshot: json!({}),
            cut_list: json!({ "items": [] }),
            adjustments,
            base_total: 10_000.0,
            final_price: 9_700.0,
            status: "placed".into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn adjustment(amount: f64, visible: bool) -> serde_json::Value {
        json!({
            "rule_id": 1, "rule_name": "R", "action_type": "surcharge_fixed",
            "description": "Surcharge", "amount": amount, "visible": visible
        })
    }

    #[test]
    fn response_hides_internal_adjustments() {
        let response = OrderResponse::try_from(order(json!([
            adjustment(-500.0, true),
            adjustment(200.0, false)
        ])))
        .unwrap();
        assert_eq!(response.adjustments.len(), 1);
        assert_eq!(response.adjustments[0].amount, -500.0);
        assert_eq!(response.final_price, 9_700.0);
    }

    #[test]
    fn unreadable_adjustments_are_an_internal_error() {
        let result = OrderResponse::try_from(order(json!("oops")));
        assert_matches!(result, Err(AppError::Core(CoreError::Internal(_))));
    }
}
