//! Append-only synchronization log models.

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use telestaff_core::types::{DbId, Timestamp};

/// A row from the `sync_logs` table. Rows are inserted once per sync attempt
/// and never mutated.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SyncLogEntry {
    pub id: DbId,
    pub availability_id: DbId,
    pub schedule_id: Option<DbId>,
    pub operation: String,
    pub outcome: String,
    pub processed: i32,
    pub created: i32,
    pub errored: i32,
    pub synced_hours: Decimal,
    pub errors: Option<String>,
    pub detail: Option<serde_json::Value>,
    pub acted_by: String,
    pub created_at: Timestamp,
}

/// DTO for inserting a sync log entry (within the sync transaction).
#[derive(Debug, Clone)]
pub struct CreateSyncLog {
    pub availability_id: DbId,
    pub schedule_id: Option<DbId>,
    pub operation: String,
    pub outcome: String,
    pub processed: i32,
    pub created: i32,
    pub errored: i32,
    pub synced_hours: Decimal,
    pub errors: Option<String>,
    pub detail: Option<serde_json::Value>,
    pub acted_by: String,
}
