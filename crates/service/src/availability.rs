//! Availability declaration workflow.
//!
//! Drives the draft -> submitted -> reviewed -> synchronized lifecycle and
//! owns every hour computation: day hours are always derived from the
//! professional's labor regime, never taken from the caller.

use std::sync::Arc;

use rust_decimal::Decimal;
use telestaff_core::availability::{self, STATE_DRAFT, STATE_SUBMITTED};
use telestaff_core::audit::{actions, ENTITY_AVAILABILITY};
use telestaff_core::error::CoreError;
use telestaff_core::hours::{hours_for_label, TurnCode};
use telestaff_core::types::DbId;
use telestaff_db::models::availability::{
    AdjustDayRequest, Availability, AvailabilityDay, AvailabilityWithDays, CreateAvailability,
    DayInput, HoursValidation, NewDay, UpdateDraft,
};
use telestaff_db::models::catalog::Professional;
use telestaff_db::repositories::{AvailabilityRepo, ProfessionalRepo};
use telestaff_db::DbPool;

use crate::actor::Actor;
use crate::audit::{AuditEvent, AuditSink};
use crate::error::ServiceError;

/// Workflow service for availability declarations.
pub struct AvailabilityService {
    pool: DbPool,
    audit: Arc<dyn AuditSink>,
}

impl AvailabilityService {
    pub fn new(pool: DbPool, audit: Arc<dyn AuditSink>) -> Self {
        AvailabilityService { pool, audit }
    }

    /// Create a new draft declaration.
    ///
    /// Fails with a conflict when a record already exists for the same
    /// (professional, period, specialty) key.
    pub async fn create_draft(
        &self,
        actor: &Actor,
        input: &CreateAvailability,
    ) -> Result<AvailabilityWithDays, ServiceError> {
        actor.ensure_access(input.professional_id)?;
        availability::validate_period(&input.period)?;

        let professional = self.load_professional(input.professional_id).await?;
        let days = compute_days(&professional.regime_label, &input.days)?;

        if AvailabilityRepo::exists_key(
            &self.pool,
            input.professional_id,
            &input.period,
            input.specialty_id,
        )
        .await?
        {
            return Err(CoreError::Conflict(format!(
                "An availability already exists for professional {} in period {} and specialty {}",
                input.professional_id, input.period, input.specialty_id
            ))
            .into());
        }

        let record = AvailabilityRepo::create(
            &self.pool,
            input.professional_id,
            input.specialty_id,
            &input.period,
            input.observations.as_deref(),
            &days,
        )
        .await?;

        self.emit(
            actor,
            actions::AVAILABILITY_CREATE,
            record.id,
            serde_json::json!({
                "period": record.period,
                "days": days.len(),
                "total_hours": record.total_hours,
            }),
        );

        let days = AvailabilityRepo::list_days(&self.pool, record.id).await?;
        Ok(AvailabilityWithDays { record, days })
    }

    /// Create-or-replace semantics for the declaration screen: creates a new
    /// draft, or replaces the day list of the existing one if it is still a
    /// draft.
    pub async fn save_draft(
        &self,
        actor: &Actor,
        input: &CreateAvailability,
    ) -> Result<AvailabilityWithDays, ServiceError> {
        actor.ensure_access(input.professional_id)?;
        availability::validate_period(&input.period)?;

        let existing = AvailabilityRepo::find_by_key(
            &self.pool,
            input.professional_id,
            &input.period,
            input.specialty_id,
        )
        .await?;

        match existing {
            None => self.create_draft(actor, input).await,
            Some(record) => {
                self.edit_draft(
                    actor,
                    record.id,
                    &UpdateDraft {
                        observations: input.observations.clone(),
                        days: input.days.clone(),
                    },
                )
                .await
            }
        }
    }

    /// Replace the day list and observations of a draft.
    pub async fn edit_draft(
        &self,
        actor: &Actor,
        id: DbId,
        input: &UpdateDraft,
    ) -> Result<AvailabilityWithDays, ServiceError> {
        let record = self.load(id).await?;
        actor.ensure_access(record.professional_id)?;
        if !availability::is_editable(&record.state) {
            return Err(CoreError::state_violation(record.state, STATE_DRAFT).into());
        }

        let professional = self.load_professional(record.professional_id).await?;
        let days = compute_days(&professional.regime_label, &input.days)?;

        let record =
            AvailabilityRepo::replace_days(&self.pool, id, input.observations.as_deref(), &days)
                .await?;

        self.emit(
            actor,
            actions::AVAILABILITY_UPDATE,
            record.id,
            serde_json::json!({
                "days": days.len(),
                "total_hours": record.total_hours,
            }),
        );

        let days = AvailabilityRepo::list_days(&self.pool, record.id).await?;
        Ok(AvailabilityWithDays { record, days })
    }

    /// Submit a draft for review. Requires at least one declared day and
    /// the committed-hours minimum.
    pub async fn submit(&self, actor: &Actor, id: DbId) -> Result<Availability, ServiceError> {
        let record = self.load(id).await?;
        actor.ensure_access(record.professional_id)?;
        availability::ensure_state(&record.state, STATE_DRAFT)?;

        let days = AvailabilityRepo::list_days(&self.pool, id).await?;
        availability::validate_submission(days.len(), record.total_hours)?;

        let submitted = AvailabilityRepo::mark_submitted(&self.pool, id)
            .await?
            .ok_or_else(|| {
                CoreError::Conflict("Record was modified concurrently during submission".into())
            })?;

        self.emit(
            actor,
            actions::AVAILABILITY_SUBMIT,
            submitted.id,
            serde_json::json!({ "total_hours": submitted.total_hours }),
        );
        Ok(submitted)
    }

    /// Approve a submitted declaration (coordinator/admin only).
    pub async fn review(
        &self,
        actor: &Actor,
        id: DbId,
        observation: Option<&str>,
    ) -> Result<Availability, ServiceError> {
        actor.ensure_staff()?;

        match AvailabilityRepo::mark_reviewed(&self.pool, id, observation).await? {
            Some(reviewed) => {
                self.emit(
                    actor,
                    actions::AVAILABILITY_REVIEW,
                    reviewed.id,
                    serde_json::json!({ "observation": observation }),
                );
                Ok(reviewed)
            }
            // The check-and-set missed: report the actual current state.
            None => {
                let record = self.load(id).await?;
                Err(CoreError::state_violation(record.state, STATE_SUBMITTED).into())
            }
        }
    }

    /// Adjust one declared day (coordinator/admin only). Allowed in any
    /// state; a synchronized record must be re-synchronized afterwards to
    /// propagate the change.
    pub async fn adjust_day(
        &self,
        actor: &Actor,
        input: &AdjustDayRequest,
    ) -> Result<AvailabilityDay, ServiceError> {
        actor.ensure_staff()?;

        let day = AvailabilityRepo::find_day(&self.pool, input.day_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("availability_day", input.day_id))?;
        let record = self.load(day.availability_id).await?;
        let professional = self.load_professional(record.professional_id).await?;

        let turn = TurnCode::parse(&input.new_turn_code)?;
        let hours = hours_for_label(&professional.regime_label, turn);

        let adjusted = AvailabilityRepo::adjust_day(
            &self.pool,
            input.day_id,
            turn.as_str(),
            hours,
            actor.id,
            input.note.as_deref(),
        )
        .await?;

        self.emit(
            actor,
            actions::AVAILABILITY_ADJUST,
            record.id,
            serde_json::json!({
                "day_id": adjusted.id,
                "day": adjusted.day,
                "turn_code": adjusted.turn_code,
                "hours": adjusted.hours,
            }),
        );
        Ok(adjusted)
    }

    /// Delete a draft. Records past draft are immutable history.
    pub async fn delete_draft(&self, actor: &Actor, id: DbId) -> Result<(), ServiceError> {
        let record = self.load(id).await?;
        actor.ensure_access(record.professional_id)?;
        if !availability::is_editable(&record.state) {
            return Err(CoreError::state_violation(record.state, STATE_DRAFT).into());
        }

        AvailabilityRepo::delete(&self.pool, id).await?;
        self.emit(
            actor,
            actions::AVAILABILITY_DELETE,
            id,
            serde_json::json!({ "period": record.period }),
        );
        Ok(())
    }

    /// Committed-hours check against the required minimum.
    pub async fn validate_hours(
        &self,
        actor: &Actor,
        id: DbId,
    ) -> Result<HoursValidation, ServiceError> {
        let record = self.load(id).await?;
        actor.ensure_access(record.professional_id)?;

        let deficit = availability::hours_deficit(record.total_hours).unwrap_or(Decimal::ZERO);
        Ok(HoursValidation {
            total_hours: record.total_hours,
            required_hours: record.required_hours,
            meets_minimum: deficit == Decimal::ZERO,
            deficit,
            fulfillment_pct: availability::fulfillment_pct(record.total_hours),
        })
    }

    /// Fetch one record with its day list, enforcing ownership.
    pub async fn get(&self, actor: &Actor, id: DbId) -> Result<AvailabilityWithDays, ServiceError> {
        let with_days = AvailabilityRepo::find_by_id_with_days(&self.pool, id)
            .await?
            .ok_or_else(|| ServiceError::not_found("availability", id))?;
        actor.ensure_access(with_days.record.professional_id)?;
        Ok(with_days)
    }

    /// List the records owned by a professional.
    pub async fn list_for_professional(
        &self,
        actor: &Actor,
        professional_id: DbId,
    ) -> Result<Vec<Availability>, ServiceError> {
        actor.ensure_access(professional_id)?;
        Ok(AvailabilityRepo::list_for_professional(&self.pool, professional_id).await?)
    }

    /// List every record of a period (coordinator/admin only).
    pub async fn list_by_period(
        &self,
        actor: &Actor,
        period: &str,
    ) -> Result<Vec<Availability>, ServiceError> {
        actor.ensure_staff()?;
        availability::validate_period(period)?;
        Ok(AvailabilityRepo::list_by_period(&self.pool, period).await?)
    }

    /// List records past draft in a period, the review work queue
    /// (coordinator/admin only).
    pub async fn list_submitted_by_period(
        &self,
        actor: &Actor,
        period: &str,
    ) -> Result<Vec<Availability>, ServiceError> {
        actor.ensure_staff()?;
        availability::validate_period(period)?;
        Ok(AvailabilityRepo::list_submitted_by_period(&self.pool, period).await?)
    }

    /// List records of one specialty within a period (coordinator/admin
    /// only).
    pub async fn list_by_specialty_and_period(
        &self,
        actor: &Actor,
        specialty_id: DbId,
        period: &str,
    ) -> Result<Vec<Availability>, ServiceError> {
        actor.ensure_staff()?;
        availability::validate_period(period)?;
        Ok(
            AvailabilityRepo::list_by_specialty_and_period(&self.pool, specialty_id, period)
                .await?,
        )
    }

    /// Whether the acting professional already declared for a period and
    /// specialty.
    pub async fn exists_mine(
        &self,
        actor: &Actor,
        period: &str,
        specialty_id: DbId,
    ) -> Result<bool, ServiceError> {
        availability::validate_period(period)?;
        Ok(AvailabilityRepo::exists_key(&self.pool, actor.id, period, specialty_id).await?)
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    async fn load(&self, id: DbId) -> Result<Availability, ServiceError> {
        AvailabilityRepo::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| ServiceError::not_found("availability", id))
    }

    async fn load_professional(&self, id: DbId) -> Result<Professional, ServiceError> {
        ProfessionalRepo::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| ServiceError::not_found("professional", id))
    }

    fn emit(&self, actor: &Actor, action: &'static str, id: DbId, detail: serde_json::Value) {
        self.audit.record(AuditEvent {
            action,
            entity: ENTITY_AVAILABILITY,
            entity_id: id,
            actor: actor.label(),
            detail,
        });
    }
}

/// Compute insertable days from caller input: validates each turn code and
/// derives the hours from the professional's labor regime.
fn compute_days(regime_label: &str, inputs: &[DayInput]) -> Result<Vec<NewDay>, CoreError> {
    let mut days = Vec::with_capacity(inputs.len());
    for input in inputs {
        let turn = TurnCode::parse(&input.turn_code)?;
        days.push(NewDay {
            day: input.day,
            turn_code: turn.as_str().to_string(),
            hours: hours_for_label(regime_label, turn),
        });
    }
    Ok(days)
}
