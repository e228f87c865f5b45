use axum::routing::post;
use axum::Router;

use crate::handlers::pricing;
use crate::state::AppState;

/// Pricing routes mounted at `/pricing`.
///
/// ```text
/// POST /preview   -> preview_price
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/preview", post(pricing::preview_price))
}
