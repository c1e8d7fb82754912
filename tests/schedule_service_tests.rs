use chrono::Utc;
use class_schedule_api::models::{DayOfWeek, ServiceError};
use class_schedule_api::repositories::{
    SaveOutcome, ScheduleSlotRepository, SqliteScheduleSlotRepository,
};

mod common;
use common::{draft, TestApp};

#[actix_web::test]
async fn test_concurrent_conflicting_creates_only_one_wins() {
    let test_app = TestApp::new().await;
    let service = test_app.schedule_service.clone();

    let mut first = draft("Algebra I", DayOfWeek::Thursday, "09:00", "10:00");
    first.classroom_id = Some("R1".to_string());
    let mut second = draft("Biology", DayOfWeek::Thursday, "09:30", "10:30");
    second.classroom_id = Some("R1".to_string());

    let (a, b) = tokio::join!(
        service.create_slot("branch-1", first),
        service.create_slot("branch-1", second)
    );

    let saved = [&a, &b].iter().filter(|r| r.is_ok()).count();
    let rejected = [&a, &b]
        .iter()
        .filter(|r| matches!(r, Err(ServiceError::Conflict(_))))
        .count();
    assert_eq!(saved, 1);
    assert_eq!(rejected, 1);

    let slots = service.list_slots("branch-1").await.unwrap();
    assert_eq!(slots.len(), 1);
}

#[actix_web::test]
async fn test_concurrent_creates_in_different_branches_all_succeed() {
    let test_app = TestApp::new().await;
    let service = test_app.schedule_service.clone();

    for round in 0..50 {
        let mut north = draft("Algebra I", DayOfWeek::Monday, "09:00", "10:00");
        north.classroom_id = Some("R1".to_string());
        let mut south = draft("Biology", DayOfWeek::Monday, "09:00", "10:00");
        south.classroom_id = Some("R1".to_string());

        let north_branch = format!("north-{}", round);
        let south_branch = format!("south-{}", round);
        let (a, b) = tokio::join!(
            service.create_slot(&north_branch, north),
            service.create_slot(&south_branch, south)
        );
        assert!(a.is_ok(), "round {}: {:?}", round, a.err());
        assert!(b.is_ok(), "round {}: {:?}", round, b.err());
    }

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM schedule_slots")
        .fetch_one(&test_app.pool)
        .await
        .unwrap();
    assert_eq!(total, 100);
    assert_eq!(service.active_branch_locks().await, 0);
}

#[actix_web::test]
async fn test_repository_serializes_concurrent_update_and_create() {
    let test_app = TestApp::new().await;
    let repository = SqliteScheduleSlotRepository::new(test_app.pool.clone());

    let mut original = draft("Algebra I", DayOfWeek::Monday, "11:00", "12:00");
    original.classroom_id = Some("R2".to_string());
    let moving = match repository.create_checked("branch-1", &original).await.unwrap() {
        SaveOutcome::Saved(slot) => slot,
        SaveOutcome::Rejected(report) => panic!("unexpected conflicts: {}", report.summary()),
    };

    // Each write is fine on its own but the two clash with each other.
    let mut moved = draft("Algebra I", DayOfWeek::Monday, "09:00", "10:00");
    moved.classroom_id = Some("R1".to_string());
    let mut newcomer = draft("Biology", DayOfWeek::Monday, "09:30", "10:30");
    newcomer.classroom_id = Some("R1".to_string());

    let (updated, created) = tokio::join!(
        repository.update_checked(moving.id, &moved),
        repository.create_checked("branch-1", &newcomer)
    );
    let updated = updated.unwrap();
    let created = created.unwrap();

    let saved = [&updated, &created]
        .iter()
        .filter(|outcome| matches!(outcome, SaveOutcome::Saved(_)))
        .count();
    assert_eq!(saved, 1);

    let in_r1: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM schedule_slots WHERE classroom_id = 'R1'")
            .fetch_one(&test_app.pool)
            .await
            .unwrap();
    assert_eq!(in_r1, 1);
}

#[actix_web::test]
async fn test_branch_locks_are_released_after_writes() {
    let test_app = TestApp::new().await;
    let service = test_app.schedule_service.clone();

    let created = service
        .create_slot("branch-1", draft("Algebra I", DayOfWeek::Monday, "09:00", "10:00"))
        .await
        .unwrap();
    service
        .create_slot("branch-2", draft("Biology", DayOfWeek::Monday, "09:00", "10:00"))
        .await
        .unwrap();
    service
        .update_slot(created.id, draft("Algebra I", DayOfWeek::Monday, "10:00", "11:00"))
        .await
        .unwrap();
    service.delete_slot(created.id).await.unwrap();

    assert_eq!(service.active_branch_locks().await, 0);
}

#[actix_web::test]
async fn test_update_keeps_branch_and_creation_time() {
    let test_app = TestApp::new().await;
    let service = test_app.schedule_service.clone();

    let created = service
        .create_slot("branch-1", draft("Algebra I", DayOfWeek::Monday, "09:00", "10:00"))
        .await
        .unwrap();

    let updated = service
        .update_slot(created.id, draft("Algebra I (B)", DayOfWeek::Tuesday, "11:00", "12:00"))
        .await
        .unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.branch_id, "branch-1");
    assert_eq!(updated.created_at.timestamp(), created.created_at.timestamp());
    assert_eq!(updated.title, "Algebra I (B)");
    assert_eq!(updated.time_slot.day_of_week, DayOfWeek::Tuesday);

    let stored = service.get_slot(created.id).await.unwrap();
    assert_eq!(stored.title, "Algebra I (B)");
    assert_eq!(stored.time_slot, updated.time_slot);
}

#[actix_web::test]
async fn test_check_slot_with_exclusion() {
    let test_app = TestApp::new().await;
    let service = test_app.schedule_service.clone();

    let mut existing = draft("Algebra I", DayOfWeek::Monday, "09:00", "10:00");
    existing.teacher_profile_id = Some("T1".to_string());
    let stored = service.create_slot("branch-1", existing.clone()).await.unwrap();

    let report = service.check_slot("branch-1", &existing, None).await.unwrap();
    assert_eq!(report.teacher_conflicts.len(), 1);
    assert_eq!(report.teacher_conflicts[0].id, stored.id);

    let report = service
        .check_slot("branch-1", &existing, Some(stored.id))
        .await
        .unwrap();
    assert!(report.is_empty());
}

#[actix_web::test]
async fn test_blank_branch_is_rejected() {
    let test_app = TestApp::new().await;
    let service = test_app.schedule_service.clone();

    let result = service
        .create_slot("  ", draft("Algebra I", DayOfWeek::Monday, "09:00", "10:00"))
        .await;
    assert!(matches!(result, Err(ServiceError::ValidationError(_))));
}

#[actix_web::test]
async fn test_storage_rejects_overlapping_rows_written_directly() {
    let test_app = TestApp::new().await;
    let service = test_app.schedule_service.clone();

    let mut existing = draft("Algebra I", DayOfWeek::Friday, "09:00", "10:00");
    existing.classroom_id = Some("R1".to_string());
    existing.staff_user_ids.insert("U1".to_string());
    service.create_slot("branch-1", existing).await.unwrap();

    let now = Utc::now();

    // Same classroom, overlapping time, written without the service.
    let err = sqlx::query(
        "INSERT INTO schedule_slots
         (branch_id, title, classroom_id, teacher_profile_id, day_of_week,
          start_minute, end_minute, created_at, updated_at)
         VALUES ('branch-1', 'Rogue', 'R1', NULL, 'FRIDAY', 570, 630, ?, ?)",
    )
    .bind(now)
    .bind(now)
    .execute(&test_app.pool)
    .await
    .unwrap_err();
    assert!(matches!(ServiceError::from(err), ServiceError::StorageConflict(_)));

    // Different room is fine, but the shared staff member is not.
    let rogue_id = sqlx::query(
        "INSERT INTO schedule_slots
         (branch_id, title, classroom_id, teacher_profile_id, day_of_week,
          start_minute, end_minute, created_at, updated_at)
         VALUES ('branch-1', 'Rogue', 'R2', NULL, 'FRIDAY', 570, 630, ?, ?)",
    )
    .bind(now)
    .bind(now)
    .execute(&test_app.pool)
    .await
    .unwrap()
    .last_insert_rowid();

    let err = sqlx::query("INSERT INTO schedule_slot_staff (slot_id, user_id) VALUES (?, 'U1')")
        .bind(rogue_id)
        .execute(&test_app.pool)
        .await
        .unwrap_err();
    assert!(matches!(ServiceError::from(err), ServiceError::StorageConflict(_)));
}
