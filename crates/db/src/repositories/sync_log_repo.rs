//! Repository for the append-only `sync_logs` table.

use sqlx::{PgPool, Postgres, Transaction};
use telestaff_core::types::DbId;

use crate::models::sync_log::{CreateSyncLog, SyncLogEntry};

const COLUMNS: &str = "id, availability_id, schedule_id, operation, outcome, \
    processed, created, errored, synced_hours, errors, detail, acted_by, created_at";

/// Writes and reads synchronization log entries. Entries are never updated
/// or deleted.
pub struct SyncLogRepo;

impl SyncLogRepo {
    /// Append a log entry within the synchronization transaction, so the log
    /// commits or rolls back together with the sync itself.
    pub async fn insert_tx(
        tx: &mut Transaction<'_, Postgres>,
        input: &CreateSyncLog,
    ) -> Result<SyncLogEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO sync_logs \
                (availability_id, schedule_id, operation, outcome, processed, \
                 created, errored, synced_hours, errors, detail, acted_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SyncLogEntry>(&query)
            .bind(input.availability_id)
            .bind(input.schedule_id)
            .bind(&input.operation)
            .bind(&input.outcome)
            .bind(input.processed)
            .bind(input.created)
            .bind(input.errored)
            .bind(input.synced_hours)
            .bind(&input.errors)
            .bind(&input.detail)
            .bind(&input.acted_by)
            .fetch_one(&mut **tx)
            .await
    }

    /// List the log history of one availability, newest first.
    pub async fn list_for_availability(
        pool: &PgPool,
        availability_id: DbId,
    ) -> Result<Vec<SyncLogEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM sync_logs \
             WHERE availability_id = $1 ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, SyncLogEntry>(&query)
            .bind(availability_id)
            .fetch_all(pool)
            .await
    }
}
