//! Handlers for saved wardrobe designs.
//!
//! Every save recomputes the cut list estimate from the submitted snapshot.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use wardrobe_core::error::CoreError;
use wardrobe_core::snapshot::WardrobeSnapshot;
use wardrobe_core::types::DbId;
use wardrobe_db::models::wardrobe::SaveWardrobe;
use wardrobe_db::repositories::WardrobeRepo;

use crate::error::AppResult;
use crate::quoting::{estimate, to_json};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CreateWardrobeRequest {
    pub customer_id: Option<DbId>,
    pub snapshot: WardrobeSnapshot,
}

#[derive(Debug, Deserialize)]
pub struct UpdateWardrobeRequest {
    pub snapshot: WardrobeSnapshot,
}

async fn prepare(
    state: &AppState,
    customer_id: Option<DbId>,
    snapshot: &WardrobeSnapshot,
) -> AppResult<SaveWardrobe> {
    let cut_list = estimate(&state.pool, snapshot).await?;
    Ok(SaveWardrobe {
        customer_id,
        name: snapshot.name.clone(),
        snapshot: to_json(snapshot)?,
        estimated_cost: cut_list.as_ref().map(|c| c.total_cost),
        cut_list: cut_list.as_ref().map(to_json).transpose()?,
    })
}

// ---------------------------------------------------------------------------
// POST /wardrobes
// ---------------------------------------------------------------------------

pub async fn create_wardrobe(
    State(state): State<AppState>,
    Json(body): Json<CreateWardrobeRequest>,
) -> AppResult<impl IntoResponse> {
    let input = prepare(&state, body.customer_id, &body.snapshot).await?;
    let wardrobe = WardrobeRepo::create(&state.pool, &input).await?;

    tracing::info!(
        wardrobe_id = wardrobe.id,
        estimated_cost = ?wardrobe.estimated_cost,
        "Wardrobe saved"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: wardrobe })))
}

// ---------------------------------------------------------------------------
// GET /wardrobes/{id}
// ---------------------------------------------------------------------------

pub async fn get_wardrobe(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let wardrobe = WardrobeRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Wardrobe",
            id,
        })?;
    Ok(Json(DataResponse { data: wardrobe }))
}

// ---------------------------------------------------------------------------
// PUT /wardrobes/{id}
// ---------------------------------------------------------------------------

pub async fn update_wardrobe(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(body): Json<UpdateWardrobeRequest>,
) -> AppResult<impl IntoResponse> {
    let input = prepare(&state, None, &body.snapshot).await?;
    let wardrobe = WardrobeRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Wardrobe",
            id,
        })?;

    tracing::info!(wardrobe_id = id, estimated_cost = ?wardrobe.estimated_cost, "Wardrobe updated");
    Ok(Json(DataResponse { data: wardrobe }))
}
