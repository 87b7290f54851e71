//! Repositories for the collaborator-owned catalogs: `professionals`,
//! `work_areas`, and `slot_catalog`.

use sqlx::{PgPool, Postgres, Transaction};
use telestaff_core::types::DbId;

use crate::models::catalog::{CreateProfessional, Professional, SlotCatalogEntry, WorkArea};

/// Column list for `professionals` queries.
const PROFESSIONAL_COLUMNS: &str = "id, full_name, document_number, email, \
    regime_label, is_active, created_at, updated_at";

/// Column list for `work_areas` queries.
const WORK_AREA_COLUMNS: &str = "id, name, is_active, created_at, updated_at";

/// Column list for `slot_catalog` queries.
const SLOT_CATALOG_COLUMNS: &str = "id, code, regime_family, hours, description, created_at";

/// Read access to the professional directory (labor regime resolution).
pub struct ProfessionalRepo;

impl ProfessionalRepo {
    /// Find a professional by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Professional>, sqlx::Error> {
        let query = format!("SELECT {PROFESSIONAL_COLUMNS} FROM professionals WHERE id = $1");
        sqlx::query_as::<_, Professional>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Register a professional. Used by seeding and integration tests; the
    /// directory itself is owned by a collaborator system.
    pub async fn create(
        pool: &PgPool,
        input: &CreateProfessional,
    ) -> Result<Professional, sqlx::Error> {
        let query = format!(
            "INSERT INTO professionals (full_name, document_number, email, regime_label)
             VALUES ($1, $2, $3, $4)
             RETURNING {PROFESSIONAL_COLUMNS}"
        );
        sqlx::query_as::<_, Professional>(&query)
            .bind(&input.full_name)
            .bind(&input.document_number)
            .bind(&input.email)
            .bind(&input.regime_label)
            .fetch_one(pool)
            .await
    }
}

/// Read access to the work-area catalog.
pub struct WorkAreaRepo;

impl WorkAreaRepo {
    /// Find a work area by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<WorkArea>, sqlx::Error> {
        let query = format!("SELECT {WORK_AREA_COLUMNS} FROM work_areas WHERE id = $1");
        sqlx::query_as::<_, WorkArea>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Create a work area (seeding and tests).
    pub async fn create(pool: &PgPool, name: &str) -> Result<WorkArea, sqlx::Error> {
        let query =
            format!("INSERT INTO work_areas (name) VALUES ($1) RETURNING {WORK_AREA_COLUMNS}");
        sqlx::query_as::<_, WorkArea>(&query)
            .bind(name)
            .fetch_one(pool)
            .await
    }

    /// Deactivate a work area (tests exercise the inactive-area sync guard).
    pub async fn deactivate(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE work_areas SET is_active = false, updated_at = NOW() \
             WHERE id = $1 AND is_active = true",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Read access to the schedule-slot catalog.
pub struct SlotCatalogRepo;

impl SlotCatalogRepo {
    /// Resolve a catalog entry by (code, regime family).
    pub async fn find_by_code_and_family(
        pool: &PgPool,
        code: &str,
        regime_family: &str,
    ) -> Result<Option<SlotCatalogEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {SLOT_CATALOG_COLUMNS} FROM slot_catalog \
             WHERE code = $1 AND regime_family = $2"
        );
        sqlx::query_as::<_, SlotCatalogEntry>(&query)
            .bind(code)
            .bind(regime_family)
            .fetch_optional(pool)
            .await
    }

    /// Resolve a catalog entry by (code, regime family) inside an open
    /// transaction, so the lookup reads from the same snapshot it commits
    /// against.
    pub async fn find_by_code_and_family_tx(
        tx: &mut Transaction<'_, Postgres>,
        code: &str,
        regime_family: &str,
    ) -> Result<Option<SlotCatalogEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {SLOT_CATALOG_COLUMNS} FROM slot_catalog \
             WHERE code = $1 AND regime_family = $2"
        );
        sqlx::query_as::<_, SlotCatalogEntry>(&query)
            .bind(code)
            .bind(regime_family)
            .fetch_optional(&mut **tx)
            .await
    }

    /// List the full catalog, ordered by regime family then code.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<SlotCatalogEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {SLOT_CATALOG_COLUMNS} FROM slot_catalog ORDER BY regime_family, code"
        );
        sqlx::query_as::<_, SlotCatalogEntry>(&query)
            .fetch_all(pool)
            .await
    }
}
