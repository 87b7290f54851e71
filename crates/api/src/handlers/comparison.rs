//! Handlers for the period comparison report.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;

use crate::error::AppResult;
use crate::extract::CallerActor;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/periods/{period}/summary
///
/// Declared-vs-synchronized hours for every record of a period.
pub async fn period_summary(
    CallerActor(actor): CallerActor,
    State(state): State<AppState>,
    Path(period): Path<String>,
) -> AppResult<impl IntoResponse> {
    let rows = state.comparison.period_summary(&actor, &period).await?;
    Ok(Json(DataResponse { data: rows }))
}

/// GET /api/v1/availabilities/{id}/comparison
///
/// Declared-vs-synchronized hours for one record.
pub async fn record_summary(
    CallerActor(actor): CallerActor,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    let row = state.comparison.record_summary(&actor, id).await?;
    Ok(Json(DataResponse { data: row }))
}
