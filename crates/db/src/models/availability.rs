//! Availability aggregate models and DTOs.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use telestaff_core::types::{DayDate, DbId, Timestamp};

/// A row from the `availabilities` table (aggregate root).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Availability {
    pub id: DbId,
    pub professional_id: DbId,
    pub specialty_id: DbId,
    pub period: String,
    pub state: String,
    pub total_hours: Decimal,
    pub required_hours: Decimal,
    pub observations: Option<String>,
    pub reviewer_observation: Option<String>,
    pub schedule_id: Option<DbId>,
    pub created_at: Timestamp,
    pub submitted_at: Option<Timestamp>,
    pub reviewed_at: Option<Timestamp>,
    pub synchronized_at: Option<Timestamp>,
    pub updated_at: Timestamp,
}

/// A row from the `availability_days` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AvailabilityDay {
    pub id: DbId,
    pub availability_id: DbId,
    pub day: DayDate,
    pub turn_code: String,
    pub hours: Decimal,
    pub adjusted_by: Option<DbId>,
    pub adjustment_note: Option<String>,
    pub created_at: Timestamp,
}

/// An availability record together with its ordered day list.
#[derive(Debug, Clone, Serialize)]
pub struct AvailabilityWithDays {
    #[serde(flatten)]
    pub record: Availability,
    pub days: Vec<AvailabilityDay>,
}

/// One declared day as supplied by the caller (hours not yet computed).
#[derive(Debug, Clone, Deserialize)]
pub struct DayInput {
    pub day: DayDate,
    pub turn_code: String,
}

/// One day ready for insertion, hours already computed from the regime.
#[derive(Debug, Clone)]
pub struct NewDay {
    pub day: DayDate,
    pub turn_code: String,
    pub hours: Decimal,
}

/// DTO for creating a draft availability.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAvailability {
    pub professional_id: DbId,
    pub specialty_id: DbId,
    pub period: String,
    pub observations: Option<String>,
    #[serde(default)]
    pub days: Vec<DayInput>,
}

/// DTO for replacing a draft's day list and observations.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateDraft {
    pub observations: Option<String>,
    pub days: Vec<DayInput>,
}

/// DTO for a coordinator day adjustment.
#[derive(Debug, Clone, Deserialize)]
pub struct AdjustDayRequest {
    pub day_id: DbId,
    pub new_turn_code: String,
    pub note: Option<String>,
}

/// Result of the committed-hours validation.
#[derive(Debug, Clone, Serialize)]
pub struct HoursValidation {
    pub total_hours: Decimal,
    pub required_hours: Decimal,
    pub meets_minimum: bool,
    pub deficit: Decimal,
    pub fulfillment_pct: Decimal,
}
