//! Repository for the `availabilities` and `availability_days` tables.
//!
//! The day list is an owned child collection: every mutation that touches
//! days recomputes the parent's `total_hours` inside the same transaction,
//! so the stored total never drifts from the sum of its children.

use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use telestaff_core::types::DbId;

use crate::models::availability::{Availability, AvailabilityDay, AvailabilityWithDays, NewDay};

/// Column list for `availabilities` queries.
const COLUMNS: &str = "id, professional_id, specialty_id, period, state, \
    total_hours, required_hours, observations, reviewer_observation, schedule_id, \
    created_at, submitted_at, reviewed_at, synchronized_at, updated_at";

/// Column list for `availability_days` queries.
const DAY_COLUMNS: &str =
    "id, availability_id, day, turn_code, hours, adjusted_by, adjustment_note, created_at";

/// Provides CRUD and state-transition operations for availability records.
pub struct AvailabilityRepo;

impl AvailabilityRepo {
    /// Insert a new draft with its day list in one transaction.
    ///
    /// `total_hours` is derived from the supplied days, never taken from the
    /// caller.
    pub async fn create(
        pool: &PgPool,
        professional_id: DbId,
        specialty_id: DbId,
        period: &str,
        observations: Option<&str>,
        days: &[NewDay],
    ) -> Result<Availability, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let total: Decimal = days.iter().map(|d| d.hours).sum();
        let insert_query = format!(
            "INSERT INTO availabilities \
                (professional_id, specialty_id, period, observations, total_hours) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        let record = sqlx::query_as::<_, Availability>(&insert_query)
            .bind(professional_id)
            .bind(specialty_id)
            .bind(period)
            .bind(observations)
            .bind(total)
            .fetch_one(&mut *tx)
            .await?;

        Self::insert_days_tx(&mut tx, record.id, days).await?;

        tx.commit().await?;
        Ok(record)
    }

    /// Find an availability by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Availability>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM availabilities WHERE id = $1");
        sqlx::query_as::<_, Availability>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an availability with its day list, ordered by date ascending.
    pub async fn find_by_id_with_days(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<AvailabilityWithDays>, sqlx::Error> {
        match Self::find_by_id(pool, id).await? {
            Some(record) => {
                let days = Self::list_days(pool, record.id).await?;
                Ok(Some(AvailabilityWithDays { record, days }))
            }
            None => Ok(None),
        }
    }

    /// List the day children of an availability, ordered by date ascending.
    pub async fn list_days(
        pool: &PgPool,
        availability_id: DbId,
    ) -> Result<Vec<AvailabilityDay>, sqlx::Error> {
        let query = format!(
            "SELECT {DAY_COLUMNS} FROM availability_days \
             WHERE availability_id = $1 ORDER BY day ASC"
        );
        sqlx::query_as::<_, AvailabilityDay>(&query)
            .bind(availability_id)
            .fetch_all(pool)
            .await
    }

    /// Find a single day child by its ID.
    pub async fn find_day(
        pool: &PgPool,
        day_id: DbId,
    ) -> Result<Option<AvailabilityDay>, sqlx::Error> {
        let query = format!("SELECT {DAY_COLUMNS} FROM availability_days WHERE id = $1");
        sqlx::query_as::<_, AvailabilityDay>(&query)
            .bind(day_id)
            .fetch_optional(pool)
            .await
    }

    /// Whether a record already exists for (professional, period, specialty).
    pub async fn exists_key(
        pool: &PgPool,
        professional_id: DbId,
        period: &str,
        specialty_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(\
                SELECT 1 FROM availabilities \
                WHERE professional_id = $1 AND period = $2 AND specialty_id = $3)",
        )
        .bind(professional_id)
        .bind(period)
        .bind(specialty_id)
        .fetch_one(pool)
        .await
    }

    /// Find the record for (professional, period, specialty), if any.
    pub async fn find_by_key(
        pool: &PgPool,
        professional_id: DbId,
        period: &str,
        specialty_id: DbId,
    ) -> Result<Option<Availability>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM availabilities \
             WHERE professional_id = $1 AND period = $2 AND specialty_id = $3"
        );
        sqlx::query_as::<_, Availability>(&query)
            .bind(professional_id)
            .bind(period)
            .bind(specialty_id)
            .fetch_optional(pool)
            .await
    }

    /// List all records of a professional, newest period first.
    pub async fn list_for_professional(
        pool: &PgPool,
        professional_id: DbId,
    ) -> Result<Vec<Availability>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM availabilities \
             WHERE professional_id = $1 ORDER BY period DESC, id DESC"
        );
        sqlx::query_as::<_, Availability>(&query)
            .bind(professional_id)
            .fetch_all(pool)
            .await
    }

    /// List all records in a period.
    pub async fn list_by_period(
        pool: &PgPool,
        period: &str,
    ) -> Result<Vec<Availability>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM availabilities WHERE period = $1 ORDER BY id ASC");
        sqlx::query_as::<_, Availability>(&query)
            .bind(period)
            .fetch_all(pool)
            .await
    }

    /// List records in a period that are past draft (submitted or later).
    pub async fn list_submitted_by_period(
        pool: &PgPool,
        period: &str,
    ) -> Result<Vec<Availability>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM availabilities \
             WHERE period = $1 AND state <> 'draft' ORDER BY id ASC"
        );
        sqlx::query_as::<_, Availability>(&query)
            .bind(period)
            .fetch_all(pool)
            .await
    }

    /// List records for a specialty within a period.
    pub async fn list_by_specialty_and_period(
        pool: &PgPool,
        specialty_id: DbId,
        period: &str,
    ) -> Result<Vec<Availability>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM availabilities \
             WHERE specialty_id = $1 AND period = $2 ORDER BY id ASC"
        );
        sqlx::query_as::<_, Availability>(&query)
            .bind(specialty_id)
            .bind(period)
            .fetch_all(pool)
            .await
    }

    /// Replace the entire day list and observations of a record.
    ///
    /// Deletes the old children, flushes the delete, inserts the new list,
    /// and recomputes `total_hours`, all in one transaction.
    pub async fn replace_days(
        pool: &PgPool,
        id: DbId,
        observations: Option<&str>,
        days: &[NewDay],
    ) -> Result<Availability, sqlx::Error> {
        let mut tx = pool.begin().await?;

        // Old rows must be physically removed before any insert; the
        // (availability_id, day) unique key would otherwise collide.
        sqlx::query("DELETE FROM availability_days WHERE availability_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        Self::insert_days_tx(&mut tx, id, days).await?;

        let update_query = format!(
            "UPDATE availabilities SET \
                observations = $2, \
                total_hours = (SELECT COALESCE(SUM(hours), 0) \
                               FROM availability_days WHERE availability_id = $1), \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let record = sqlx::query_as::<_, Availability>(&update_query)
            .bind(id)
            .bind(observations)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(record)
    }

    /// Apply a coordinator adjustment to one day and recompute the parent
    /// total in the same transaction.
    pub async fn adjust_day(
        pool: &PgPool,
        day_id: DbId,
        new_turn_code: &str,
        new_hours: Decimal,
        adjusted_by: DbId,
        note: Option<&str>,
    ) -> Result<AvailabilityDay, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let day_query = format!(
            "UPDATE availability_days SET \
                turn_code = $2, hours = $3, adjusted_by = $4, adjustment_note = $5 \
             WHERE id = $1 \
             RETURNING {DAY_COLUMNS}"
        );
        let day = sqlx::query_as::<_, AvailabilityDay>(&day_query)
            .bind(day_id)
            .bind(new_turn_code)
            .bind(new_hours)
            .bind(adjusted_by)
            .bind(note)
            .fetch_one(&mut *tx)
            .await?;

        Self::recompute_total_tx(&mut tx, day.availability_id).await?;

        tx.commit().await?;
        Ok(day)
    }

    /// Transition draft -> submitted with a state check-and-set.
    ///
    /// Returns the updated record, or `None` when the record was not in
    /// draft (lost race or wrong state; the caller distinguishes).
    pub async fn mark_submitted(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<Availability>, sqlx::Error> {
        let query = format!(
            "UPDATE availabilities SET \
                state = 'submitted', submitted_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND state = 'draft' \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Availability>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Transition submitted -> reviewed with a state check-and-set, so two
    /// concurrent reviews cannot both succeed.
    pub async fn mark_reviewed(
        pool: &PgPool,
        id: DbId,
        reviewer_observation: Option<&str>,
    ) -> Result<Option<Availability>, sqlx::Error> {
        let query = format!(
            "UPDATE availabilities SET \
                state = 'reviewed', reviewer_observation = $2, \
                reviewed_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND state = 'submitted' \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Availability>(&query)
            .bind(id)
            .bind(reviewer_observation)
            .fetch_optional(pool)
            .await
    }

    /// Demote synchronized -> reviewed so a corrected record can be
    /// synchronized again.
    pub async fn demote_to_reviewed(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<Availability>, sqlx::Error> {
        let query = format!(
            "UPDATE availabilities SET state = 'reviewed', updated_at = NOW() \
             WHERE id = $1 AND state = 'synchronized' \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Availability>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Transition reviewed -> synchronized within the sync transaction,
    /// storing the schedule back-reference.
    pub async fn mark_synchronized_tx(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
        schedule_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE availabilities SET \
                state = 'synchronized', schedule_id = $2, \
                synchronized_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND state = 'reviewed'",
        )
        .bind(id)
        .bind(schedule_id)
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a record (day children cascade). The service layer enforces the
    /// draft-only rule before calling this.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM availabilities WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Sum of the child day hours (authoritative total).
    pub async fn sum_day_hours(pool: &PgPool, id: DbId) -> Result<Decimal, sqlx::Error> {
        sqlx::query_scalar::<_, Decimal>(
            "SELECT COALESCE(SUM(hours), 0) FROM availability_days WHERE availability_id = $1",
        )
        .bind(id)
        .fetch_one(pool)
        .await
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    /// Insert day children within an existing transaction.
    async fn insert_days_tx(
        tx: &mut Transaction<'_, Postgres>,
        availability_id: DbId,
        days: &[NewDay],
    ) -> Result<(), sqlx::Error> {
        for day in days {
            sqlx::query(
                "INSERT INTO availability_days (availability_id, day, turn_code, hours) \
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(availability_id)
            .bind(day.day)
            .bind(&day.turn_code)
            .bind(day.hours)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }

    /// Recompute the stored total from the day children within a transaction.
    async fn recompute_total_tx(
        tx: &mut Transaction<'_, Postgres>,
        availability_id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE availabilities SET \
                total_hours = (SELECT COALESCE(SUM(hours), 0) \
                               FROM availability_days WHERE availability_id = $1), \
                updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(availability_id)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}
