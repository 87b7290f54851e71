//! Declared-vs-synchronized comparison reporting for a period.

use rust_decimal::Decimal;
use serde::Serialize;
use telestaff_core::availability::{self, STATE_SYNCHRONIZED};
use telestaff_core::schedule::is_inconsistent;
use telestaff_core::types::DbId;
use telestaff_db::models::availability::Availability;
use telestaff_db::repositories::{AvailabilityRepo, ProfessionalRepo, ScheduleRepo};
use telestaff_db::DbPool;

use crate::actor::Actor;
use crate::error::ServiceError;

/// One row of the period summary: a professional's declared hours against
/// what actually landed in the schedule.
#[derive(Debug, Clone, Serialize)]
pub struct PeriodSummaryRow {
    pub availability_id: DbId,
    pub professional_id: DbId,
    pub professional_name: String,
    pub specialty_id: DbId,
    pub state: String,
    pub declared_hours: Decimal,
    pub synchronized_hours: Decimal,
    pub slot_count: i64,
    pub difference: Decimal,
    pub inconsistent: bool,
}

/// Comparison reporting service (coordinator/admin only).
pub struct ComparisonService {
    pool: DbPool,
}

impl ComparisonService {
    pub fn new(pool: DbPool) -> Self {
        ComparisonService { pool }
    }

    /// Summarize every record of a period. A record that is not (or no
    /// longer) synchronized reports zero synchronized hours and is flagged
    /// whenever its declared total exceeds the tolerance.
    pub async fn period_summary(
        &self,
        actor: &Actor,
        period: &str,
    ) -> Result<Vec<PeriodSummaryRow>, ServiceError> {
        actor.ensure_staff()?;
        availability::validate_period(period)?;

        let records = AvailabilityRepo::list_by_period(&self.pool, period).await?;
        let mut rows = Vec::with_capacity(records.len());
        for record in records {
            rows.push(self.row_for(record).await?);
        }
        Ok(rows)
    }

    /// Compare a single record against its synchronized schedule. The owning
    /// professional may read their own row; staff may read any.
    pub async fn record_summary(
        &self,
        actor: &Actor,
        availability_id: DbId,
    ) -> Result<PeriodSummaryRow, ServiceError> {
        let record = AvailabilityRepo::find_by_id(&self.pool, availability_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("availability", availability_id))?;
        actor.ensure_access(record.professional_id)?;
        self.row_for(record).await
    }

    async fn row_for(&self, record: Availability) -> Result<PeriodSummaryRow, ServiceError> {
        let professional_name =
            match ProfessionalRepo::find_by_id(&self.pool, record.professional_id).await? {
                Some(professional) => professional.full_name,
                None => format!("professional {}", record.professional_id),
            };

        // Synchronized hours only count for a record that is actually in
        // the synchronized state; a demoted or pending record reads zero.
        let (synchronized_hours, slot_count) = match record.schedule_id {
            Some(schedule_id) if record.state == STATE_SYNCHRONIZED => {
                let hours = ScheduleRepo::find_by_id(&self.pool, schedule_id)
                    .await?
                    .map(|s| s.total_hours)
                    .unwrap_or(Decimal::ZERO);
                let count = ScheduleRepo::count_slots(&self.pool, schedule_id).await?;
                (hours, count)
            }
            _ => (Decimal::ZERO, 0),
        };

        let difference = record.total_hours - synchronized_hours;
        Ok(PeriodSummaryRow {
            availability_id: record.id,
            professional_id: record.professional_id,
            professional_name,
            specialty_id: record.specialty_id,
            state: record.state,
            declared_hours: record.total_hours,
            synchronized_hours,
            slot_count,
            difference,
            inconsistent: is_inconsistent(record.total_hours, synchronized_hours),
        })
    }
}
