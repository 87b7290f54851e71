//! Handlers for the availability declaration workflow.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use telestaff_core::types::DbId;
use telestaff_db::models::availability::{AdjustDayRequest, CreateAvailability, UpdateDraft};

use crate::error::AppResult;
use crate::extract::CallerActor;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/availabilities
///
/// Create a new draft declaration. Conflicts when a record already exists
/// for the same (professional, period, specialty).
pub async fn create(
    CallerActor(actor): CallerActor,
    State(state): State<AppState>,
    Json(input): Json<CreateAvailability>,
) -> AppResult<impl IntoResponse> {
    let created = state.availability.create_draft(&actor, &input).await?;
    tracing::info!(
        availability_id = created.record.id,
        period = %created.record.period,
        "Availability draft created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: created })))
}

/// PUT /api/v1/availabilities/draft
///
/// Create-or-replace semantics for the declaration screen.
pub async fn save_draft(
    CallerActor(actor): CallerActor,
    State(state): State<AppState>,
    Json(input): Json<CreateAvailability>,
) -> AppResult<impl IntoResponse> {
    let saved = state.availability.save_draft(&actor, &input).await?;
    Ok(Json(DataResponse { data: saved }))
}

/// GET /api/v1/availabilities/{id}
pub async fn get(
    CallerActor(actor): CallerActor,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let record = state.availability.get(&actor, id).await?;
    Ok(Json(DataResponse { data: record }))
}

/// PUT /api/v1/availabilities/{id}
///
/// Replace the day list and observations of a draft.
pub async fn update(
    CallerActor(actor): CallerActor,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateDraft>,
) -> AppResult<impl IntoResponse> {
    let updated = state.availability.edit_draft(&actor, id, &input).await?;
    Ok(Json(DataResponse { data: updated }))
}

/// DELETE /api/v1/availabilities/{id}
pub async fn delete(
    CallerActor(actor): CallerActor,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    state.availability.delete_draft(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/availabilities/{id}/submit
pub async fn submit(
    CallerActor(actor): CallerActor,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let submitted = state.availability.submit(&actor, id).await?;
    tracing::info!(availability_id = id, "Availability submitted for review");
    Ok(Json(DataResponse { data: submitted }))
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub observation: Option<String>,
}

/// POST /api/v1/availabilities/{id}/review
pub async fn review(
    CallerActor(actor): CallerActor,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ReviewRequest>,
) -> AppResult<impl IntoResponse> {
    let reviewed = state
        .availability
        .review(&actor, id, input.observation.as_deref())
        .await?;
    tracing::info!(availability_id = id, "Availability reviewed");
    Ok(Json(DataResponse { data: reviewed }))
}

/// POST /api/v1/availabilities/days/adjust
///
/// Coordinator adjustment of one declared day.
pub async fn adjust_day(
    CallerActor(actor): CallerActor,
    State(state): State<AppState>,
    Json(input): Json<AdjustDayRequest>,
) -> AppResult<impl IntoResponse> {
    let adjusted = state.availability.adjust_day(&actor, &input).await?;
    Ok(Json(DataResponse { data: adjusted }))
}

/// GET /api/v1/availabilities/{id}/hours-check
///
/// Committed-hours validation against the required minimum.
pub async fn hours_check(
    CallerActor(actor): CallerActor,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let check = state.availability.validate_hours(&actor, id).await?;
    Ok(Json(DataResponse { data: check }))
}

#[derive(Debug, Deserialize)]
pub struct ExistsQuery {
    pub period: String,
    pub specialty_id: DbId,
}

/// GET /api/v1/availabilities/exists?period=YYYYMM&specialty_id=N
///
/// Whether the acting professional already declared for the period.
pub async fn exists(
    CallerActor(actor): CallerActor,
    State(state): State<AppState>,
    Query(query): Query<ExistsQuery>,
) -> AppResult<impl IntoResponse> {
    let exists = state
        .availability
        .exists_mine(&actor, &query.period, query.specialty_id)
        .await?;
    Ok(Json(json!({ "data": { "exists": exists } })))
}

/// GET /api/v1/professionals/{id}/availabilities
pub async fn list_for_professional(
    CallerActor(actor): CallerActor,
    State(state): State<AppState>,
    Path(professional_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let records = state
        .availability
        .list_for_professional(&actor, professional_id)
        .await?;
    Ok(Json(DataResponse { data: records }))
}

#[derive(Debug, Deserialize)]
pub struct PeriodListQuery {
    pub specialty_id: Option<DbId>,
    /// When true, only records past draft (the review work queue).
    #[serde(default)]
    pub submitted: bool,
}

/// GET /api/v1/periods/{period}/availabilities
///
/// Coordinator listing of a period, optionally filtered by specialty or
/// narrowed to the review work queue.
pub async fn list_by_period(
    CallerActor(actor): CallerActor,
    State(state): State<AppState>,
    Path(period): Path<String>,
    Query(query): Query<PeriodListQuery>,
) -> AppResult<impl IntoResponse> {
    let records = match query.specialty_id {
        Some(specialty_id) => {
            state
                .availability
                .list_by_specialty_and_period(&actor, specialty_id, &period)
                .await?
        }
        None if query.submitted => {
            state
                .availability
                .list_submitted_by_period(&actor, &period)
                .await?
        }
        None => state.availability.list_by_period(&actor, &period).await?,
    };
    Ok(Json(DataResponse { data: records }))
}
