//! Schedule synchronization: project a reviewed availability into the
//! operational schedule the booking front end consumes.
//!
//! The projection runs in one transaction: find-or-create the schedule,
//! drop its old slots, map each declared day to a catalog slot, recompute
//! the total, flip the record to synchronized, and append the log entry.
//! A catalog-mapping miss is an expected per-day failure and only degrades
//! the outcome to partial; any database failure rolls the whole thing back.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use telestaff_core::availability::{self, STATE_REVIEWED, STATE_SYNCHRONIZED};
use telestaff_core::audit::{actions, ENTITY_AVAILABILITY};
use telestaff_core::error::CoreError;
use telestaff_core::hours::{RegimeFamily, TurnCode};
use telestaff_core::schedule::{slot_code, SHIFT_TYPE_BOOKING};
use telestaff_core::sync::{MappingTally, OPERATION_CREATE, OPERATION_UPDATE};
use telestaff_core::types::DbId;
use telestaff_db::models::sync_log::{CreateSyncLog, SyncLogEntry};
use telestaff_db::repositories::{
    AvailabilityRepo, ProfessionalRepo, ScheduleRepo, SlotCatalogRepo, SyncLogRepo, WorkAreaRepo,
};
use telestaff_db::DbPool;

use crate::actor::Actor;
use crate::audit::{AuditEvent, AuditSink};
use crate::error::ServiceError;

/// Outcome of one synchronization run.
#[derive(Debug, Clone, Serialize)]
pub struct SyncResult {
    pub availability_id: DbId,
    pub schedule_id: DbId,
    pub log_entry_id: DbId,
    pub operation: String,
    pub outcome: String,
    pub processed: i32,
    pub created: i32,
    pub errored: i32,
    pub synced_hours: Decimal,
    pub message: String,
    pub errors: Vec<String>,
}

/// Synchronization service (coordinator/admin only).
pub struct SyncService {
    pool: DbPool,
    audit: Arc<dyn AuditSink>,
}

impl SyncService {
    pub fn new(pool: DbPool, audit: Arc<dyn AuditSink>) -> Self {
        SyncService { pool, audit }
    }

    /// Whether a record is ready for synchronization.
    pub async fn can_sync(&self, id: DbId) -> Result<bool, ServiceError> {
        let record = AvailabilityRepo::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| ServiceError::not_found("availability", id))?;
        Ok(record.state == STATE_REVIEWED)
    }

    /// Synchronize a reviewed availability into the schedule for the given
    /// work area.
    pub async fn sync(
        &self,
        actor: &Actor,
        availability_id: DbId,
        work_area_id: DbId,
    ) -> Result<SyncResult, ServiceError> {
        actor.ensure_staff()?;
        let result = self
            .run_sync(actor, availability_id, work_area_id)
            .await?;
        self.emit(actor, actions::SCHEDULE_SYNC, &result);
        Ok(result)
    }

    /// Reopen a synchronized record: demote it back to reviewed so `sync`
    /// can run again against the current day list.
    pub async fn force_resync(&self, actor: &Actor, availability_id: DbId) -> Result<(), ServiceError> {
        actor.ensure_staff()?;

        let record = AvailabilityRepo::find_by_id(&self.pool, availability_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("availability", availability_id))?;
        availability::ensure_state(&record.state, STATE_SYNCHRONIZED)?;

        AvailabilityRepo::demote_to_reviewed(&self.pool, availability_id)
            .await?
            .ok_or_else(|| {
                CoreError::Conflict("Record was modified concurrently during resync".into())
            })?;
        Ok(())
    }

    /// Re-synchronize an already synchronized record after adjustments:
    /// [`Self::force_resync`] followed by the normal projection, which
    /// rebuilds the slots of the existing schedule.
    pub async fn resync(
        &self,
        actor: &Actor,
        availability_id: DbId,
        work_area_id: DbId,
    ) -> Result<SyncResult, ServiceError> {
        self.force_resync(actor, availability_id).await?;

        let result = self
            .run_sync(actor, availability_id, work_area_id)
            .await?;
        self.emit(actor, actions::SCHEDULE_RESYNC, &result);
        Ok(result)
    }

    /// Synchronization history of a record, newest first.
    pub async fn history(
        &self,
        actor: &Actor,
        availability_id: DbId,
    ) -> Result<Vec<SyncLogEntry>, ServiceError> {
        let record = AvailabilityRepo::find_by_id(&self.pool, availability_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("availability", availability_id))?;
        actor.ensure_access(record.professional_id)?;
        Ok(SyncLogRepo::list_for_availability(&self.pool, availability_id).await?)
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    async fn run_sync(
        &self,
        actor: &Actor,
        availability_id: DbId,
        work_area_id: DbId,
    ) -> Result<SyncResult, ServiceError> {
        let with_days = AvailabilityRepo::find_by_id_with_days(&self.pool, availability_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("availability", availability_id))?;
        let record = &with_days.record;
        availability::ensure_state(&record.state, STATE_REVIEWED)?;
        if with_days.days.is_empty() {
            return Err(CoreError::Validation(
                "Cannot synchronize an availability with no declared days".into(),
            )
            .into());
        }

        let professional = ProfessionalRepo::find_by_id(&self.pool, record.professional_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("professional", record.professional_id))?;
        let family = resolve_family(&professional.regime_label);

        let area = WorkAreaRepo::find_by_id(&self.pool, work_area_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("work_area", work_area_id))?;
        if !area.is_active {
            return Err(CoreError::Validation(format!(
                "Work area '{}' is inactive and cannot receive schedules",
                area.name
            ))
            .into());
        }

        // Operation label only; the transactional find-or-create below is
        // what actually serializes concurrent creates.
        let operation =
            match ScheduleRepo::find_by_key(&self.pool, &record.period, record.professional_id, work_area_id)
                .await?
            {
                Some(_) => OPERATION_UPDATE,
                None => OPERATION_CREATE,
            };

        let mut tx = self.pool.begin().await?;

        let schedule = ScheduleRepo::find_or_create_tx(
            &mut tx,
            &record.period,
            record.professional_id,
            work_area_id,
        )
        .await?;

        // Old slots go first so a rebuilt schedule never mixes generations.
        ScheduleRepo::delete_slots_tx(&mut tx, schedule.id).await?;

        let mut tally = MappingTally::default();
        for day in &with_days.days {
            let turn = match TurnCode::parse(&day.turn_code) {
                Ok(turn) => turn,
                Err(err) => {
                    tally.record_error(format!("{}: {err}", day.day));
                    continue;
                }
            };
            let code = slot_code(turn);
            match SlotCatalogRepo::find_by_code_and_family_tx(&mut tx, code, family.as_str())
                .await?
            {
                Some(entry) => {
                    ScheduleRepo::insert_slot_tx(
                        &mut tx,
                        schedule.id,
                        day.day,
                        entry.id,
                        SHIFT_TYPE_BOOKING,
                    )
                    .await?;
                    tally.record_created();
                }
                None => {
                    tally.record_error(format!(
                        "{}: no catalog slot for code {code} in family {}",
                        day.day,
                        family.as_str()
                    ));
                }
            }
        }

        let synced_hours = ScheduleRepo::recompute_total_tx(&mut tx, schedule.id).await?;

        let moved =
            AvailabilityRepo::mark_synchronized_tx(&mut tx, availability_id, schedule.id).await?;
        if !moved {
            // Dropping the transaction rolls everything back.
            return Err(CoreError::Conflict(
                "Record state changed during synchronization".into(),
            )
            .into());
        }

        let log_entry = SyncLogRepo::insert_tx(
            &mut tx,
            &CreateSyncLog {
                availability_id,
                schedule_id: Some(schedule.id),
                operation: operation.to_string(),
                outcome: tally.outcome().to_string(),
                processed: tally.processed,
                created: tally.created,
                errored: tally.errored,
                synced_hours,
                errors: tally.joined_errors(),
                detail: Some(serde_json::json!({
                    "period": record.period,
                    "work_area_id": work_area_id,
                    "regime_family": family.as_str(),
                })),
                acted_by: actor.label(),
            },
        )
        .await?;

        tx.commit().await?;

        let message = tally.summary_message(operation, synced_hours);
        tracing::info!(
            availability_id,
            schedule_id = schedule.id,
            outcome = tally.outcome(),
            %synced_hours,
            "schedule synchronized"
        );

        Ok(SyncResult {
            availability_id,
            schedule_id: schedule.id,
            log_entry_id: log_entry.id,
            operation: operation.to_string(),
            outcome: tally.outcome().to_string(),
            processed: tally.processed,
            created: tally.created,
            errored: tally.errored,
            synced_hours,
            message,
            errors: tally.errors,
        })
    }

    fn emit(&self, actor: &Actor, action: &'static str, result: &SyncResult) {
        self.audit.record(AuditEvent {
            action,
            entity: ENTITY_AVAILABILITY,
            entity_id: result.availability_id,
            actor: actor.label(),
            detail: serde_json::json!({
                "schedule_id": result.schedule_id,
                "operation": result.operation,
                "outcome": result.outcome,
                "synced_hours": result.synced_hours,
            }),
        });
    }
}

/// Resolve the regime family for slot-catalog lookups, falling back to the
/// hourly table on an unrecognized label.
fn resolve_family(regime_label: &str) -> RegimeFamily {
    match RegimeFamily::from_label(regime_label) {
        Some(family) => family,
        None => {
            tracing::warn!(
                regime = %regime_label,
                "Unrecognized labor regime, using hourly slot catalog"
            );
            RegimeFamily::Hourly
        }
    }
}
