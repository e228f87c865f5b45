use axum::routing::{get, post};
use axum::Router;

use crate::handlers::wardrobes;
use crate::state::AppState;

/// Wardrobe routes mounted at `/wardrobes`.
///
/// ```text
/// POST /       -> create_wardrobe
/// GET  /{id}   -> get_wardrobe
/// PUT  /{id}   -> update_wardrobe
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(wardrobes::create_wardrobe))
        .route(
            "/{id}",
            get(wardrobes::get_wardrobe).put(wardrobes::update_wardrobe),
        )
}
