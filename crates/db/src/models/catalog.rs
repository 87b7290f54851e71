//! Collaborator-owned catalog models: professionals, work areas, and the
//! schedule-slot catalog.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use telestaff_core::types::{DbId, Timestamp};

/// A row from the `professionals` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Professional {
    pub id: DbId,
    pub full_name: String,
    pub document_number: Option<String>,
    pub email: Option<String>,
    pub regime_label: String,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for registering a professional (seeding and tests).
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProfessional {
    pub full_name: String,
    pub document_number: Option<String>,
    pub email: Option<String>,
    pub regime_label: String,
}

/// A row from the `work_areas` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WorkArea {
    pub id: DbId,
    pub name: String,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `slot_catalog` table: one bookable slot definition per
/// (code, regime family) pair.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SlotCatalogEntry {
    pub id: DbId,
    pub code: String,
    pub regime_family: String,
    pub hours: Decimal,
    pub description: Option<String>,
    pub created_at: Timestamp,
}
