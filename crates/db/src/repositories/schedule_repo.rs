//! Repository for the `schedules` and `schedule_slots` tables.
//!
//! All slot mutations happen inside the caller's synchronization
//! transaction; the pool-based methods here are read-only.

use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use telestaff_core::types::{DayDate, DbId};

use crate::models::schedule::{Schedule, ScheduleSlot, ScheduleWithSlots};

const COLUMNS: &str =
    "id, period, professional_id, work_area_id, total_hours, note, created_at, updated_at";

const SLOT_COLUMNS: &str = "id, schedule_id, day, slot_catalog_id, shift_type, note, created_at";

/// Provides lookup and slot-rebuild operations for schedules.
pub struct ScheduleRepo;

impl ScheduleRepo {
    /// Find a schedule by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Schedule>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM schedules WHERE id = $1");
        sqlx::query_as::<_, Schedule>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the schedule for (period, professional, work area), if any.
    pub async fn find_by_key(
        pool: &PgPool,
        period: &str,
        professional_id: DbId,
        work_area_id: DbId,
    ) -> Result<Option<Schedule>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM schedules \
             WHERE period = $1 AND professional_id = $2 AND work_area_id = $3"
        );
        sqlx::query_as::<_, Schedule>(&query)
            .bind(period)
            .bind(professional_id)
            .bind(work_area_id)
            .fetch_optional(pool)
            .await
    }

    /// Find or create the schedule row for (period, professional, work area).
    ///
    /// The unique key on those columns plus `ON CONFLICT` make this safe
    /// against two syncs racing to create the same schedule.
    pub async fn find_or_create_tx(
        tx: &mut Transaction<'_, Postgres>,
        period: &str,
        professional_id: DbId,
        work_area_id: DbId,
    ) -> Result<Schedule, sqlx::Error> {
        let query = format!(
            "INSERT INTO schedules (period, professional_id, work_area_id) \
             VALUES ($1, $2, $3) \
             ON CONFLICT ON CONSTRAINT uq_schedule_period_professional_area \
             DO UPDATE SET updated_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Schedule>(&query)
            .bind(period)
            .bind(professional_id)
            .bind(work_area_id)
            .fetch_one(&mut **tx)
            .await
    }

    /// Remove every slot of a schedule. Runs and completes before any new
    /// slot insert in the same transaction.
    pub async fn delete_slots_tx(
        tx: &mut Transaction<'_, Postgres>,
        schedule_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM schedule_slots WHERE schedule_id = $1")
            .bind(schedule_id)
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected())
    }

    /// Insert one slot within the synchronization transaction.
    pub async fn insert_slot_tx(
        tx: &mut Transaction<'_, Postgres>,
        schedule_id: DbId,
        day: DayDate,
        slot_catalog_id: DbId,
        shift_type: &str,
    ) -> Result<ScheduleSlot, sqlx::Error> {
        let query = format!(
            "INSERT INTO schedule_slots (schedule_id, day, slot_catalog_id, shift_type) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {SLOT_COLUMNS}"
        );
        sqlx::query_as::<_, ScheduleSlot>(&query)
            .bind(schedule_id)
            .bind(day)
            .bind(slot_catalog_id)
            .bind(shift_type)
            .fetch_one(&mut **tx)
            .await
    }

    /// Recompute the schedule total from the catalog hours of its slots.
    /// Returns the new total.
    pub async fn recompute_total_tx(
        tx: &mut Transaction<'_, Postgres>,
        schedule_id: DbId,
    ) -> Result<Decimal, sqlx::Error> {
        sqlx::query_scalar::<_, Decimal>(
            "UPDATE schedules SET \
                total_hours = (SELECT COALESCE(SUM(sc.hours), 0) \
                               FROM schedule_slots ss \
                               JOIN slot_catalog sc ON sc.id = ss.slot_catalog_id \
                               WHERE ss.schedule_id = $1), \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING total_hours",
        )
        .bind(schedule_id)
        .fetch_one(&mut **tx)
        .await
    }

    /// Fetch a schedule with its slots, ordered by date ascending.
    pub async fn find_with_slots(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ScheduleWithSlots>, sqlx::Error> {
        match Self::find_by_id(pool, id).await? {
            Some(schedule) => {
                let slot_query = format!(
                    "SELECT {SLOT_COLUMNS} FROM schedule_slots \
                     WHERE schedule_id = $1 ORDER BY day ASC"
                );
                let slots = sqlx::query_as::<_, ScheduleSlot>(&slot_query)
                    .bind(schedule.id)
                    .fetch_all(pool)
                    .await?;
                Ok(Some(ScheduleWithSlots { schedule, slots }))
            }
            None => Ok(None),
        }
    }

    /// Count the slots of a schedule.
    pub async fn count_slots(pool: &PgPool, schedule_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM schedule_slots WHERE schedule_id = $1")
            .bind(schedule_id)
            .fetch_one(pool)
            .await
    }
}
