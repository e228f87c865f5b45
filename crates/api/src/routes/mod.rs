pub mod health;
pub mod orders;
pub mod pricing;
pub mod wardrobes;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /wardrobes                  save a design (POST)
/// /wardrobes/{id}             get, replace design
///
/// /pricing/preview            price preview (POST, throttled)
///
/// /orders                     place order (POST)
/// /orders/{id}                get order
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/wardrobes", wardrobes::router())
        .nest("/pricing", pricing::router())
        .nest("/orders", orders::router())
}
