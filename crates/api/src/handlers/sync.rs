//! Handlers for schedule synchronization.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use telestaff_core::types::DbId;

use crate::error::AppResult;
use crate::extract::CallerActor;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SyncRequest {
    pub work_area_id: DbId,
}

/// POST /api/v1/availabilities/{id}/sync
///
/// Project a reviewed availability into the operational schedule.
pub async fn sync(
    CallerActor(actor): CallerActor,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<SyncRequest>,
) -> AppResult<impl IntoResponse> {
    let result = state.sync.sync(&actor, id, input.work_area_id).await?;
    tracing::info!(
        availability_id = id,
        schedule_id = result.schedule_id,
        outcome = %result.outcome,
        "Availability synchronized"
    );
    Ok(Json(DataResponse { data: result }))
}

/// POST /api/v1/availabilities/{id}/resync
///
/// Rebuild the schedule of an already synchronized record.
pub async fn resync(
    CallerActor(actor): CallerActor,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<SyncRequest>,
) -> AppResult<impl IntoResponse> {
    let result = state.sync.resync(&actor, id, input.work_area_id).await?;
    tracing::info!(
        availability_id = id,
        schedule_id = result.schedule_id,
        outcome = %result.outcome,
        "Availability re-synchronized"
    );
    Ok(Json(DataResponse { data: result }))
}

/// POST /api/v1/availabilities/{id}/force-resync
///
/// Demote a synchronized record back to reviewed without rebuilding the
/// schedule, so a corrected day list can be synchronized explicitly later.
pub async fn force_resync(
    CallerActor(actor): CallerActor,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    state.sync.force_resync(&actor, id).await?;
    tracing::info!(availability_id = id, "Availability reopened for resync");
    Ok(Json(json!({ "data": { "state": "reviewed" } })))
}

/// GET /api/v1/availabilities/{id}/sync-status
pub async fn sync_status(
    CallerActor(_actor): CallerActor,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let ready = state.sync.can_sync(id).await?;
    Ok(Json(json!({ "data": { "can_sync": ready } })))
}

/// GET /api/v1/availabilities/{id}/sync-history
///
/// Synchronization log of a record, newest first.
pub async fn sync_history(
    CallerActor(actor): CallerActor,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let history = state.sync.history(&actor, id).await?;
    Ok(Json(DataResponse { data: history }))
}
