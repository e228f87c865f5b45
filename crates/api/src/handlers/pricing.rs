//! Live price preview for the editor.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use wardrobe_core::cut_list::CutList;
use wardrobe_core::rules::Adjustment;
use wardrobe_core::snapshot::WardrobeSnapshot;
use wardrobe_core::types::DbId;

use crate::error::{AppError, AppResult};
use crate::quoting::{quote, QuoteRequest};
use crate::response::DataResponse;
use crate::state::AppState;
use crate::throttle::ThrottleKey;

#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    pub snapshot: WardrobeSnapshot,
    pub customer_id: Option<DbId>,
    pub destination: Option<String>,
}

/// A preview never fails for an incomplete design; it reports
/// `priceable: false` instead.
#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub priceable: bool,
    pub cut_list: Option<CutList>,
    pub base_total: Option<f64>,
    /// Customer-facing adjustments only.
    pub adjustments: Vec<Adjustment>,
    pub final_price: Option<f64>,
}

/// Customer id if given, else the first forwarded client address.
pub fn throttle_key(customer_id: Option<DbId>, headers: &HeaderMap) -> ThrottleKey {
    if let Some(id) = customer_id {
        return ThrottleKey::Customer(id);
    }
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| ThrottleKey::Client(v.to_string()))
        .unwrap_or(ThrottleKey::Anonymous)
}

// ---------------------------------------------------------------------------
// POST /pricing/preview
// ---------------------------------------------------------------------------

pub async fn preview_price(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<PreviewRequest>,
) -> AppResult<impl IntoResponse> {
    let key = throttle_key(body.customer_id, &headers);
    if !state.throttle.allow(&key) {
        tracing::warn!(?key, "Price preview throttled");
        return Err(AppError::TooManyRequests(
            "Too many price previews, please slow down".into(),
        ));
    }

    let request = QuoteRequest {
        customer_id: body.customer_id,
        destination: body.destination,
    };
    let response = match quote(&state.pool, &body.snapshot, &request).await? {
        Some(q) => {
            let adjustments = q.visible_adjustments();
            PreviewResponse {
                priceable: true,
                base_total: Some(q.base_total),
                final_price: Some(q.final_price),
                cut_list: Some(q.cut_list),
                adjustments,
            }
        }
        None => PreviewResponse {
            priceable: false,
            cut_list: None,
            base_total: None,
            adjustments: Vec::new(),
            final_price: None,
        },
    };
    Ok(Json(DataResponse { data: response }))
}
