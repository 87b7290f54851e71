//! Integration tests for the repository layer against a real database:
//! - Availability creation with day children and derived totals
//! - Unique-key and state check-and-set behaviour
//! - Day replacement (delete before insert) and total recomputation
//! - Schedule find-or-create and slot rebuild
//! - Append-only sync log ordering

use rust_decimal_macros::dec;
use sqlx::PgPool;
use telestaff_db::models::availability::NewDay;
use telestaff_db::models::catalog::CreateProfessional;
use telestaff_db::models::sync_log::CreateSyncLog;
use telestaff_db::repositories::{
    AvailabilityRepo, ProfessionalRepo, ScheduleRepo, SlotCatalogRepo, SyncLogRepo, WorkAreaRepo,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_professional(name: &str, regime: &str) -> CreateProfessional {
    CreateProfessional {
        full_name: name.to_string(),
        document_number: None,
        email: None,
        regime_label: regime.to_string(),
    }
}

fn day(ymd: (i32, u32, u32), turn: &str, hours: rust_decimal::Decimal) -> NewDay {
    NewDay {
        day: chrono::NaiveDate::from_ymd_opt(ymd.0, ymd.1, ymd.2).unwrap(),
        turn_code: turn.to_string(),
        hours,
    }
}

// ---------------------------------------------------------------------------
// Test: availability creation derives the total from its days
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_create_availability_with_days(pool: PgPool) {
    let professional = ProfessionalRepo::create(&pool, &new_professional("Ana Torres", "CAS"))
        .await
        .unwrap();

    let days = vec![
        day((2026, 3, 2), "M", dec!(4.00)),
        day((2026, 3, 3), "MT", dec!(8.00)),
    ];
    let record = AvailabilityRepo::create(&pool, professional.id, 7, "202603", None, &days)
        .await
        .unwrap();

    assert_eq!(record.state, "draft");
    assert_eq!(record.total_hours, dec!(12.00));
    assert_eq!(record.required_hours, dec!(150.00));
    assert!(record.schedule_id.is_none());

    let with_days = AvailabilityRepo::find_by_id_with_days(&pool, record.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(with_days.days.len(), 2);
    // Ordered by date ascending.
    assert_eq!(with_days.days[0].turn_code, "M");
    assert_eq!(with_days.days[1].turn_code, "MT");
}

// ---------------------------------------------------------------------------
// Test: one record per (professional, period, specialty)
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_duplicate_key_rejected(pool: PgPool) {
    let professional = ProfessionalRepo::create(&pool, &new_professional("Luis Vega", "728"))
        .await
        .unwrap();

    let days = vec![day((2026, 3, 2), "M", dec!(4.00))];
    AvailabilityRepo::create(&pool, professional.id, 7, "202603", None, &days)
        .await
        .unwrap();

    let duplicate = AvailabilityRepo::create(&pool, professional.id, 7, "202603", None, &days).await;
    assert!(duplicate.is_err());

    assert!(
        AvailabilityRepo::exists_key(&pool, professional.id, "202603", 7)
            .await
            .unwrap()
    );
    // A different specialty in the same period is a separate record.
    assert!(
        !AvailabilityRepo::exists_key(&pool, professional.id, "202603", 8)
            .await
            .unwrap()
    );
}

// ---------------------------------------------------------------------------
// Test: replace_days swaps the day list and recomputes the total
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_replace_days_recomputes_total(pool: PgPool) {
    let professional = ProfessionalRepo::create(&pool, &new_professional("Rosa Diaz", "LOCADOR"))
        .await
        .unwrap();

    let initial = vec![day((2026, 4, 1), "M", dec!(6.00))];
    let record = AvailabilityRepo::create(&pool, professional.id, 3, "202604", None, &initial)
        .await
        .unwrap();
    assert_eq!(record.total_hours, dec!(6.00));

    // Replacement reuses a date from the old list; the delete must land first.
    let replacement = vec![
        day((2026, 4, 1), "MT", dec!(12.00)),
        day((2026, 4, 2), "T", dec!(6.00)),
    ];
    let updated = AvailabilityRepo::replace_days(&pool, record.id, Some("updated"), &replacement)
        .await
        .unwrap();

    assert_eq!(updated.total_hours, dec!(18.00));
    assert_eq!(updated.observations.as_deref(), Some("updated"));

    let days = AvailabilityRepo::list_days(&pool, record.id).await.unwrap();
    assert_eq!(days.len(), 2);
    assert_eq!(days[0].turn_code, "MT");
}

// ---------------------------------------------------------------------------
// Test: state transitions are check-and-set
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_state_transitions(pool: PgPool) {
    let professional = ProfessionalRepo::create(&pool, &new_professional("Ivan Ruiz", "CAS"))
        .await
        .unwrap();
    let days = vec![day((2026, 5, 4), "MT", dec!(8.00))];
    let record = AvailabilityRepo::create(&pool, professional.id, 2, "202605", None, &days)
        .await
        .unwrap();

    let submitted = AvailabilityRepo::mark_submitted(&pool, record.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(submitted.state, "submitted");
    assert!(submitted.submitted_at.is_some());

    // A second submit finds no draft row.
    assert!(AvailabilityRepo::mark_submitted(&pool, record.id)
        .await
        .unwrap()
        .is_none());

    let reviewed = AvailabilityRepo::mark_reviewed(&pool, record.id, Some("ok"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reviewed.state, "reviewed");
    assert_eq!(reviewed.reviewer_observation.as_deref(), Some("ok"));

    // Concurrent second review loses the check-and-set.
    assert!(AvailabilityRepo::mark_reviewed(&pool, record.id, None)
        .await
        .unwrap()
        .is_none());

    // Demotion only applies to synchronized records.
    assert!(AvailabilityRepo::demote_to_reviewed(&pool, record.id)
        .await
        .unwrap()
        .is_none());
}

// ---------------------------------------------------------------------------
// Test: mark_synchronized_tx requires the reviewed state
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_mark_synchronized_requires_reviewed(pool: PgPool) {
    let professional = ProfessionalRepo::create(&pool, &new_professional("Elsa Paz", "728"))
        .await
        .unwrap();
    let area = WorkAreaRepo::create(&pool, "Teleconsulta").await.unwrap();
    let days = vec![day((2026, 6, 1), "M", dec!(4.00))];
    let record = AvailabilityRepo::create(&pool, professional.id, 1, "202606", None, &days)
        .await
        .unwrap();

    let mut tx = pool.begin().await.unwrap();
    let schedule = ScheduleRepo::find_or_create_tx(&mut tx, "202606", professional.id, area.id)
        .await
        .unwrap();
    // Still a draft, so the transition must not apply.
    let moved = AvailabilityRepo::mark_synchronized_tx(&mut tx, record.id, schedule.id)
        .await
        .unwrap();
    assert!(!moved);
    tx.rollback().await.unwrap();

    AvailabilityRepo::mark_submitted(&pool, record.id)
        .await
        .unwrap();
    AvailabilityRepo::mark_reviewed(&pool, record.id, None)
        .await
        .unwrap();

    let mut tx = pool.begin().await.unwrap();
    let schedule = ScheduleRepo::find_or_create_tx(&mut tx, "202606", professional.id, area.id)
        .await
        .unwrap();
    let moved = AvailabilityRepo::mark_synchronized_tx(&mut tx, record.id, schedule.id)
        .await
        .unwrap();
    assert!(moved);
    tx.commit().await.unwrap();

    let synced = AvailabilityRepo::find_by_id(&pool, record.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(synced.state, "synchronized");
    assert_eq!(synced.schedule_id, Some(schedule.id));
    assert!(synced.synchronized_at.is_some());
}

// ---------------------------------------------------------------------------
// Test: schedule find-or-create returns the same row for the same key
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_schedule_find_or_create_is_idempotent(pool: PgPool) {
    let professional = ProfessionalRepo::create(&pool, &new_professional("Mia Soto", "CAS"))
        .await
        .unwrap();
    let area = WorkAreaRepo::create(&pool, "Telemonitoreo").await.unwrap();

    let mut tx = pool.begin().await.unwrap();
    let first = ScheduleRepo::find_or_create_tx(&mut tx, "202607", professional.id, area.id)
        .await
        .unwrap();
    let second = ScheduleRepo::find_or_create_tx(&mut tx, "202607", professional.id, area.id)
        .await
        .unwrap();
    tx.commit().await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(first.total_hours, dec!(0.00));
}

// ---------------------------------------------------------------------------
// Test: slot rebuild sums catalog hours per regime family
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_slot_rebuild_and_total(pool: PgPool) {
    let professional = ProfessionalRepo::create(&pool, &new_professional("Noa Lara", "728"))
        .await
        .unwrap();
    let area = WorkAreaRepo::create(&pool, "Teleorientacion").await.unwrap();
    let days = vec![day((2026, 8, 3), "M", dec!(4.00))];
    let record = AvailabilityRepo::create(&pool, professional.id, 5, "202608", None, &days)
        .await
        .unwrap();
    let day_rows = AvailabilityRepo::list_days(&pool, record.id).await.unwrap();

    let morning = SlotCatalogRepo::find_by_code_and_family(&pool, "158", "hourly")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(morning.hours, dec!(4.00));

    let mut tx = pool.begin().await.unwrap();
    let schedule = ScheduleRepo::find_or_create_tx(&mut tx, "202608", professional.id, area.id)
        .await
        .unwrap();
    ScheduleRepo::insert_slot_tx(
        &mut tx,
        schedule.id,
        day_rows[0].day,
        morning.id,
        "TRN_BOOKING",
    )
    .await
    .unwrap();
    let total = ScheduleRepo::recompute_total_tx(&mut tx, schedule.id)
        .await
        .unwrap();
    assert_eq!(total, dec!(4.00));

    // Rebuild: every old slot goes before the new list lands. The
    // replacement entry resolves through the same transaction.
    let removed = ScheduleRepo::delete_slots_tx(&mut tx, schedule.id)
        .await
        .unwrap();
    assert_eq!(removed, 1);
    let full_day = SlotCatalogRepo::find_by_code_and_family_tx(&mut tx, "200A", "hourly")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(full_day.hours, dec!(8.00));
    ScheduleRepo::insert_slot_tx(
        &mut tx,
        schedule.id,
        day_rows[0].day,
        full_day.id,
        "TRN_BOOKING",
    )
    .await
    .unwrap();
    let total = ScheduleRepo::recompute_total_tx(&mut tx, schedule.id)
        .await
        .unwrap();
    assert_eq!(total, dec!(8.00));
    tx.commit().await.unwrap();

    let with_slots = ScheduleRepo::find_with_slots(&pool, schedule.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(with_slots.slots.len(), 1);
    assert_eq!(with_slots.slots[0].slot_catalog_id, full_day.id);
    assert_eq!(with_slots.schedule.total_hours, dec!(8.00));
}

// ---------------------------------------------------------------------------
// Test: sync log history is newest first
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_sync_log_history_order(pool: PgPool) {
    let professional = ProfessionalRepo::create(&pool, &new_professional("Leo Mena", "CAS"))
        .await
        .unwrap();
    let days = vec![day((2026, 9, 7), "T", dec!(4.00))];
    let record = AvailabilityRepo::create(&pool, professional.id, 4, "202609", None, &days)
        .await
        .unwrap();

    for (operation, outcome) in [("create", "success"), ("update", "partial")] {
        let mut tx = pool.begin().await.unwrap();
        SyncLogRepo::insert_tx(
            &mut tx,
            &CreateSyncLog {
                availability_id: record.id,
                schedule_id: None,
                operation: operation.to_string(),
                outcome: outcome.to_string(),
                processed: 1,
                created: 1,
                errored: 0,
                synced_hours: dec!(4.00),
                errors: None,
                detail: None,
                acted_by: "coordinator:9".to_string(),
            },
        )
        .await
        .unwrap();
        tx.commit().await.unwrap();
    }

    let history = SyncLogRepo::list_for_availability(&pool, record.id)
        .await
        .unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].operation, "update");
    assert_eq!(history[1].operation, "create");
    assert_eq!(history[0].acted_by, "coordinator:9");
}

// ---------------------------------------------------------------------------
// Test: deleting an availability cascades to its days
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_delete_cascades_days(pool: PgPool) {
    let professional = ProfessionalRepo::create(&pool, &new_professional("Tea Rios", "LOCADOR"))
        .await
        .unwrap();
    let days = vec![
        day((2026, 10, 1), "M", dec!(6.00)),
        day((2026, 10, 2), "T", dec!(6.00)),
    ];
    let record = AvailabilityRepo::create(&pool, professional.id, 6, "202610", None, &days)
        .await
        .unwrap();

    assert!(AvailabilityRepo::delete(&pool, record.id).await.unwrap());
    assert!(AvailabilityRepo::find_by_id(&pool, record.id)
        .await
        .unwrap()
        .is_none());
    assert!(AvailabilityRepo::list_days(&pool, record.id)
        .await
        .unwrap()
        .is_empty());
}
