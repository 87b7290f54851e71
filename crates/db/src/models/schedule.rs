//! Operational schedule aggregate models (consumed by the booking front end).

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use telestaff_core::types::{DayDate, DbId, Timestamp};

/// A row from the `schedules` table, keyed by (period, professional, work area).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Schedule {
    pub id: DbId,
    pub period: String,
    pub professional_id: DbId,
    pub work_area_id: DbId,
    pub total_hours: Decimal,
    pub note: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `schedule_slots` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ScheduleSlot {
    pub id: DbId,
    pub schedule_id: DbId,
    pub day: DayDate,
    pub slot_catalog_id: DbId,
    pub shift_type: String,
    pub note: Option<String>,
    pub created_at: Timestamp,
}

/// A schedule together with its ordered slot list.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleWithSlots {
    #[serde(flatten)]
    pub schedule: Schedule,
    pub slots: Vec<ScheduleSlot>,
}
