//! Integration tests for schedule synchronization: slot projection, the
//! partial-outcome path, resynchronization, and the period comparison
//! report.

use std::sync::Arc;

use assert_matches::assert_matches;
use rust_decimal_macros::dec;
use sqlx::PgPool;
use telestaff_core::error::CoreError;
use telestaff_db::models::availability::CreateAvailability;
use telestaff_db::models::catalog::CreateProfessional;
use telestaff_db::repositories::{
    AvailabilityRepo, ProfessionalRepo, ScheduleRepo, SlotCatalogRepo, WorkAreaRepo,
};
use telestaff_service::audit::NullAuditSink;
use telestaff_service::{
    Actor, AvailabilityService, ComparisonService, Role, ServiceError, SyncService,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn services(pool: &PgPool) -> (AvailabilityService, SyncService, ComparisonService) {
    let sink = Arc::new(NullAuditSink);
    (
        AvailabilityService::new(pool.clone(), sink.clone()),
        SyncService::new(pool.clone(), sink),
        ComparisonService::new(pool.clone()),
    )
}

async fn seed_professional(pool: &PgPool, name: &str, regime: &str) -> i64 {
    ProfessionalRepo::create(
        pool,
        &CreateProfessional {
            full_name: name.to_string(),
            document_number: None,
            email: None,
            regime_label: regime.to_string(),
        },
    )
    .await
    .unwrap()
    .id
}

/// Create an availability with the given turns and drive it to reviewed
/// through the repository layer, bypassing the submission threshold.
async fn seed_reviewed(
    pool: &PgPool,
    svc: &AvailabilityService,
    professional_id: i64,
    period: &str,
    year: i32,
    month: u32,
    turns: &[&str],
) -> i64 {
    let actor = Actor::new(professional_id, Role::Professional);
    let input = CreateAvailability {
        professional_id,
        specialty_id: 7,
        period: period.to_string(),
        observations: None,
        days: turns
            .iter()
            .enumerate()
            .map(|(i, turn)| telestaff_db::models::availability::DayInput {
                day: chrono::NaiveDate::from_ymd_opt(year, month, (i + 1) as u32).unwrap(),
                turn_code: turn.to_string(),
            })
            .collect(),
    };
    let draft = svc.create_draft(&actor, &input).await.unwrap();
    AvailabilityRepo::mark_submitted(pool, draft.record.id)
        .await
        .unwrap()
        .unwrap();
    AvailabilityRepo::mark_reviewed(pool, draft.record.id, None)
        .await
        .unwrap()
        .unwrap();
    draft.record.id
}

// ---------------------------------------------------------------------------
// Test: clean sync projects every day to its catalog slot
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_sync_success(pool: PgPool) {
    let (availability, sync, _) = services(&pool);
    let coordinator = Actor::new(10, Role::Coordinator);
    let professional_id = seed_professional(&pool, "Hugo Prado", "D.L. 728").await;
    let area = WorkAreaRepo::create(&pool, "Teleconsulta").await.unwrap();

    let id = seed_reviewed(
        &pool,
        &availability,
        professional_id,
        "202603",
        2026,
        3,
        &["M", "T", "MT"],
    )
    .await;

    assert!(sync.can_sync(id).await.unwrap());
    let result = sync.sync(&coordinator, id, area.id).await.unwrap();

    assert_eq!(result.operation, "create");
    assert_eq!(result.outcome, "success");
    assert_eq!(result.processed, 3);
    assert_eq!(result.created, 3);
    assert_eq!(result.errored, 0);
    assert_eq!(result.synced_hours, dec!(16.00));
    assert!(result.errors.is_empty());

    let record = AvailabilityRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(record.state, "synchronized");
    assert_eq!(record.schedule_id, Some(result.schedule_id));
    assert!(!sync.can_sync(id).await.unwrap());

    // The log entry commits with the sync itself.
    let history = sync.history(&coordinator, id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, result.log_entry_id);
    assert_eq!(history[0].synced_hours, dec!(16.00));

    // Each turn mapped to its slot code: M -> 158, T -> 131, MT -> 200A.
    let with_slots = ScheduleRepo::find_with_slots(&pool, result.schedule_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(with_slots.slots.len(), 3);
    assert_eq!(with_slots.schedule.total_hours, dec!(16.00));
    let morning = SlotCatalogRepo::find_by_code_and_family(&pool, "158", "hourly")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(with_slots.slots[0].slot_catalog_id, morning.id);
    assert!(with_slots
        .slots
        .iter()
        .all(|slot| slot.shift_type == "TRN_BOOKING"));
}

// ---------------------------------------------------------------------------
// Test: a catalog miss degrades the outcome to partial
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_sync_partial_on_catalog_miss(pool: PgPool) {
    let (availability, sync, _) = services(&pool);
    let coordinator = Actor::new(10, Role::Coordinator);
    let professional_id = seed_professional(&pool, "Carla Nunez", "LOCADOR").await;
    let area = WorkAreaRepo::create(&pool, "Telemonitoreo").await.unwrap();

    // Remove the contractor full-day entry so MT cannot map.
    sqlx::query("DELETE FROM slot_catalog WHERE code = '200A' AND regime_family = 'contractor'")
        .execute(&pool)
        .await
        .unwrap();

    let id = seed_reviewed(
        &pool,
        &availability,
        professional_id,
        "202604",
        2026,
        4,
        &["M", "MT"],
    )
    .await;

    let result = sync.sync(&coordinator, id, area.id).await.unwrap();

    assert_eq!(result.outcome, "partial");
    assert_eq!(result.processed, 2);
    assert_eq!(result.created, 1);
    assert_eq!(result.errored, 1);
    assert_eq!(result.synced_hours, dec!(6.00));
    assert!(result.errors[0].contains("200A"));

    // The mapped subset still commits and the record still transitions.
    let record = AvailabilityRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(record.state, "synchronized");

    let history = sync.history(&coordinator, id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].outcome, "partial");
    assert!(history[0].errors.as_deref().unwrap().contains("200A"));
}

// ---------------------------------------------------------------------------
// Test: resync rebuilds the same schedule
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_resync_rebuilds_same_schedule(pool: PgPool) {
    let (availability, sync, _) = services(&pool);
    let coordinator = Actor::new(10, Role::Coordinator);
    let professional_id = seed_professional(&pool, "Eva Molina", "CAS").await;
    let area = WorkAreaRepo::create(&pool, "Teleconsulta").await.unwrap();

    let id = seed_reviewed(
        &pool,
        &availability,
        professional_id,
        "202605",
        2026,
        5,
        &["MT", "MT"],
    )
    .await;

    let first = sync.sync(&coordinator, id, area.id).await.unwrap();
    assert_eq!(first.operation, "create");
    assert_eq!(first.synced_hours, dec!(16.00));

    // Resync on an unchanged record is idempotent: same schedule, same
    // slots, same hours.
    let second = sync.resync(&coordinator, id, area.id).await.unwrap();
    assert_eq!(second.schedule_id, first.schedule_id);
    assert_eq!(second.operation, "update");
    assert_eq!(second.synced_hours, dec!(16.00));
    assert_eq!(
        ScheduleRepo::count_slots(&pool, first.schedule_id).await.unwrap(),
        2
    );

    // Resync is only defined for synchronized records.
    let fresh = seed_reviewed(
        &pool,
        &availability,
        professional_id,
        "202606",
        2026,
        6,
        &["M"],
    )
    .await;
    let err = sync.resync(&coordinator, fresh, area.id).await.unwrap_err();
    assert_matches!(
        err,
        ServiceError::Core(CoreError::StateViolation { required: "synchronized", .. })
    );

    let history = sync.history(&coordinator, id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].operation, "update");
    assert_eq!(history[1].operation, "create");

    // Standalone reopen drops the record back to reviewed without touching
    // the existing slots.
    sync.force_resync(&coordinator, id).await.unwrap();
    let record = AvailabilityRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(record.state, "reviewed");
    assert!(sync.can_sync(id).await.unwrap());
    assert_eq!(
        ScheduleRepo::count_slots(&pool, first.schedule_id).await.unwrap(),
        2
    );
}

// ---------------------------------------------------------------------------
// Test: sync guards
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_sync_guards(pool: PgPool) {
    let (availability, sync, _) = services(&pool);
    let coordinator = Actor::new(10, Role::Coordinator);
    let professional_id = seed_professional(&pool, "Saul Paz", "CAS").await;
    let professional = Actor::new(professional_id, Role::Professional);
    let area = WorkAreaRepo::create(&pool, "Teleorientacion").await.unwrap();

    let input = CreateAvailability {
        professional_id,
        specialty_id: 7,
        period: "202607".to_string(),
        observations: None,
        days: vec![telestaff_db::models::availability::DayInput {
            day: chrono::NaiveDate::from_ymd_opt(2026, 7, 1).unwrap(),
            turn_code: "M".to_string(),
        }],
    };
    let draft = availability.create_draft(&professional, &input).await.unwrap();

    // Only staff synchronize.
    let err = sync.sync(&professional, draft.record.id, area.id).await.unwrap_err();
    assert_matches!(err, ServiceError::Core(CoreError::Forbidden(_)));

    // A draft is not ready.
    assert!(!sync.can_sync(draft.record.id).await.unwrap());
    let err = sync.sync(&coordinator, draft.record.id, area.id).await.unwrap_err();
    assert_matches!(
        err,
        ServiceError::Core(CoreError::StateViolation { required: "reviewed", .. })
    );

    // An inactive work area never receives schedules.
    let id = seed_reviewed(
        &pool,
        &availability,
        professional_id,
        "202608",
        2026,
        8,
        &["M"],
    )
    .await;
    WorkAreaRepo::deactivate(&pool, area.id).await.unwrap();
    let err = sync.sync(&coordinator, id, area.id).await.unwrap_err();
    assert_matches!(err, ServiceError::Core(CoreError::Validation(message)) => {
        assert!(message.contains("inactive"));
    });

    // Nothing committed: the record stays reviewed with no history.
    let record = AvailabilityRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(record.state, "reviewed");
    assert!(sync.history(&coordinator, id).await.unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Test: history ownership
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_history_ownership(pool: PgPool) {
    let (availability, sync, _) = services(&pool);
    let coordinator = Actor::new(10, Role::Coordinator);
    let owner_id = seed_professional(&pool, "Nora Paredes", "CAS").await;
    let other_id = seed_professional(&pool, "Raul Ibarra", "CAS").await;
    let area = WorkAreaRepo::create(&pool, "Teleconsulta").await.unwrap();

    let id = seed_reviewed(&pool, &availability, owner_id, "202609", 2026, 9, &["M"]).await;
    sync.sync(&coordinator, id, area.id).await.unwrap();

    let owner = Actor::new(owner_id, Role::Professional);
    assert_eq!(sync.history(&owner, id).await.unwrap().len(), 1);

    let other = Actor::new(other_id, Role::Professional);
    let err = sync.history(&other, id).await.unwrap_err();
    assert_matches!(err, ServiceError::Core(CoreError::Forbidden(_)));
}

// ---------------------------------------------------------------------------
// Test: period comparison report
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_period_summary(pool: PgPool) {
    let (availability, sync, comparison) = services(&pool);
    let coordinator = Actor::new(10, Role::Coordinator);
    let area = WorkAreaRepo::create(&pool, "Teleconsulta").await.unwrap();

    // One record synchronized cleanly, one submitted but never synced.
    let synced_pro = seed_professional(&pool, "Hugo Prado", "728").await;
    let synced_id = seed_reviewed(
        &pool,
        &availability,
        synced_pro,
        "202610",
        2026,
        10,
        &["M", "T", "MT"],
    )
    .await;
    sync.sync(&coordinator, synced_id, area.id).await.unwrap();

    let pending_pro = seed_professional(&pool, "Carla Nunez", "LOCADOR").await;
    let pending_actor = Actor::new(pending_pro, Role::Professional);
    let input = CreateAvailability {
        professional_id: pending_pro,
        specialty_id: 7,
        period: "202610".to_string(),
        observations: None,
        days: vec![telestaff_db::models::availability::DayInput {
            day: chrono::NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
            turn_code: "MT".to_string(),
        }],
    };
    let pending = availability.create_draft(&pending_actor, &input).await.unwrap();
    AvailabilityRepo::mark_submitted(&pool, pending.record.id)
        .await
        .unwrap()
        .unwrap();

    // The professional role is rejected.
    let err = comparison.period_summary(&pending_actor, "202610").await.unwrap_err();
    assert_matches!(err, ServiceError::Core(CoreError::Forbidden(_)));

    let rows = comparison.period_summary(&coordinator, "202610").await.unwrap();
    assert_eq!(rows.len(), 2);

    let synced_row = rows
        .iter()
        .find(|r| r.availability_id == synced_id)
        .unwrap();
    assert_eq!(synced_row.declared_hours, dec!(16.00));
    assert_eq!(synced_row.synchronized_hours, dec!(16.00));
    assert_eq!(synced_row.difference, dec!(0.00));
    assert_eq!(synced_row.slot_count, 3);
    assert!(!synced_row.inconsistent);
    assert_eq!(synced_row.professional_name, "Hugo Prado");

    // 12 declared vs 0 synchronized exceeds the 1-hour tolerance.
    let pending_row = rows
        .iter()
        .find(|r| r.availability_id == pending.record.id)
        .unwrap();
    assert_eq!(pending_row.declared_hours, dec!(12.00));
    assert_eq!(pending_row.synchronized_hours, dec!(0.00));
    assert_eq!(pending_row.slot_count, 0);
    assert_eq!(pending_row.difference, dec!(12.00));
    assert!(pending_row.inconsistent);
    assert_eq!(pending_row.state, "submitted");
}

// ---------------------------------------------------------------------------
// Test: single-record comparison
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_record_summary(pool: PgPool) {
    let (availability, sync, comparison) = services(&pool);
    let coordinator = Actor::new(10, Role::Coordinator);
    let area = WorkAreaRepo::create(&pool, "Teleconsulta").await.unwrap();
    let owner_id = seed_professional(&pool, "Hugo Prado", "728").await;
    let other_id = seed_professional(&pool, "Raul Ibarra", "CAS").await;

    let id = seed_reviewed(
        &pool,
        &availability,
        owner_id,
        "202611",
        2026,
        11,
        &["M", "T"],
    )
    .await;

    // Before synchronization the row reads zero synced hours.
    let row = comparison.record_summary(&coordinator, id).await.unwrap();
    assert_eq!(row.declared_hours, dec!(8.00));
    assert_eq!(row.synchronized_hours, dec!(0.00));
    assert_eq!(row.slot_count, 0);
    assert!(row.inconsistent);

    sync.sync(&coordinator, id, area.id).await.unwrap();

    let row = comparison.record_summary(&coordinator, id).await.unwrap();
    assert_eq!(row.state, "synchronized");
    assert_eq!(row.declared_hours, dec!(8.00));
    assert_eq!(row.synchronized_hours, dec!(8.00));
    assert_eq!(row.slot_count, 2);
    assert!(!row.inconsistent);

    // The owner reads their own row; anyone else is rejected.
    let owner = Actor::new(owner_id, Role::Professional);
    let row = comparison.record_summary(&owner, id).await.unwrap();
    assert_eq!(row.availability_id, id);

    let other = Actor::new(other_id, Role::Professional);
    let err = comparison.record_summary(&other, id).await.unwrap_err();
    assert_matches!(err, ServiceError::Core(CoreError::Forbidden(_)));

    let err = comparison.record_summary(&coordinator, 999_999).await.unwrap_err();
    assert_matches!(err, ServiceError::Core(CoreError::NotFound { .. }));
}
