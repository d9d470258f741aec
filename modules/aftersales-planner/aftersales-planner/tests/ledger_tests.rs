#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use aftersales_planner::domain::error::DomainError;
use aftersales_planner::{
    Category, DayEntryPatch, EmployeePatch, NewDayEntry, NewEmployee, PlannerConfig,
};
use common::{file_db, memory_db, services};
use time::Date;
use time::macros::date;

const DAY: Date = date!(2025 - 03 - 07);

fn entry(work_day: Date, category: Category, aw: i32) -> NewDayEntry {
    NewDayEntry {
        work_day,
        category,
        title: Some("Inspektion".to_owned()),
        work_text: "Bremsen pruefen".to_owned(),
        drop_off: Some("07:45".to_owned()),
        pick_up: None,
        aw,
        created_by: None,
    }
}

async fn hire(
    svc: &common::Services,
    name: &str,
    category: Category,
    performance: i32,
) -> uuid::Uuid {
    svc.employees
        .create(NewEmployee {
            name: name.to_owned(),
            category,
            performance,
        })
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn second_booking_beyond_capacity_is_rejected() {
    let db = memory_db().await;
    let svc = services(&db, PlannerConfig::default());
    hire(&svc, "Jonas", Category::Mech, 100).await;

    svc.entries.create(entry(DAY, Category::Mech, 50)).await.unwrap();
    let err = svc
        .entries
        .create(entry(DAY, Category::Mech, 50))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        DomainError::InsufficientCapacity {
            remaining: 46,
            requested: 50
        }
    );

    let bucket = svc.entries.remaining(DAY, Category::Mech).await.unwrap();
    assert_eq!((bucket.capacity, bucket.used, bucket.remaining()), (96, 50, 46));
    assert_eq!(svc.entries.list(Some(DAY), Some(DAY)).await.unwrap().len(), 1);
}

#[tokio::test]
async fn concurrent_bookings_cannot_both_fit() {
    let db = memory_db().await;
    let svc = services(&db, PlannerConfig::default());
    hire(&svc, "Jonas", Category::Mech, 100).await;

    let (a, b) = tokio::join!(
        svc.entries.create(entry(DAY, Category::Mech, 60)),
        svc.entries.create(entry(DAY, Category::Mech, 60)),
    );
    let booked = [a.is_ok(), b.is_ok()].into_iter().filter(|ok| *ok).count();
    assert_eq!(booked, 1);
    let rejected = if a.is_err() { a } else { b };
    assert_eq!(
        rejected.unwrap_err(),
        DomainError::InsufficientCapacity {
            remaining: 36,
            requested: 60
        }
    );
    let used = svc.entries.remaining(DAY, Category::Mech).await.unwrap().used;
    assert_eq!(used, 60);
}

#[tokio::test]
async fn concurrent_bookings_on_a_pooled_database_admit_exactly_one() {
    const WRITERS: usize = 8;
    let dir = tempfile::tempdir().unwrap();
    let db = file_db(&dir, 8).await;
    let svc = services(&db, PlannerConfig::default());
    hire(&svc, "Jonas", Category::Mech, 100).await;

    let tasks: Vec<_> = (0..WRITERS)
        .map(|_| {
            let entries = svc.entries.clone();
            tokio::spawn(async move { entries.create(entry(DAY, Category::Mech, 60)).await })
        })
        .collect();

    let mut booked = 0;
    let mut rejected = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => booked += 1,
            Err(DomainError::InsufficientCapacity { requested: 60, .. }) => rejected += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(booked, 1);
    assert_eq!(rejected, WRITERS - 1);
    let used = svc.entries.remaining(DAY, Category::Mech).await.unwrap().used;
    assert_eq!(used, 60);
}

#[tokio::test]
async fn buckets_are_independent_per_category_and_day() {
    let db = memory_db().await;
    let svc = services(&db, PlannerConfig::default());
    hire(&svc, "Jonas", Category::Mech, 100).await;
    hire(&svc, "Mia", Category::Body, 150).await;

    svc.entries.create(entry(DAY, Category::Mech, 96)).await.unwrap();
    svc.entries.create(entry(DAY, Category::Body, 144)).await.unwrap();
    svc.entries
        .create(entry(date!(2025 - 03 - 08), Category::Mech, 96))
        .await
        .unwrap();

    let err = svc.entries.create(entry(DAY, Category::Prep, 1)).await.unwrap_err();
    assert_eq!(
        err,
        DomainError::InsufficientCapacity {
            remaining: 0,
            requested: 1
        }
    );
}

#[tokio::test]
async fn zero_aw_entries_always_fit() {
    let db = memory_db().await;
    let svc = services(&db, PlannerConfig::default());

    // No employees at all: capacity is zero.
    let booked = svc.entries.create(entry(DAY, Category::Prep, 0)).await.unwrap();
    assert_eq!(booked.aw, 0);
    assert_eq!(booked.title.as_deref(), Some("Inspektion"));
}

#[tokio::test]
async fn update_checks_capacity_without_counting_itself() {
    let db = memory_db().await;
    let svc = services(&db, PlannerConfig::default());
    hire(&svc, "Jonas", Category::Mech, 100).await;

    let e = svc.entries.create(entry(DAY, Category::Mech, 90)).await.unwrap();
    let grown = svc
        .entries
        .update(
            e.id,
            DayEntryPatch {
                aw: Some(96),
                ..DayEntryPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(grown.aw, 96);

    let err = svc
        .entries
        .update(
            e.id,
            DayEntryPatch {
                aw: Some(97),
                ..DayEntryPatch::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(
        err,
        DomainError::InsufficientCapacity {
            remaining: 96,
            requested: 97
        }
    );
}

#[tokio::test]
async fn moving_an_entry_is_checked_against_the_target_bucket() {
    let db = memory_db().await;
    let svc = services(&db, PlannerConfig::default());
    hire(&svc, "Jonas", Category::Mech, 100).await;
    hire(&svc, "Lea", Category::Prep, 50).await;

    let e = svc.entries.create(entry(DAY, Category::Mech, 60)).await.unwrap();
    let err = svc
        .entries
        .update(
            e.id,
            DayEntryPatch {
                category: Some(Category::Prep),
                ..DayEntryPatch::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(
        err,
        DomainError::InsufficientCapacity {
            remaining: 48,
            requested: 60
        }
    );

    let moved = svc
        .entries
        .update(
            e.id,
            DayEntryPatch {
                work_day: Some(date!(2025 - 03 - 10)),
                ..DayEntryPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(moved.work_day, date!(2025 - 03 - 10));
    assert_eq!(svc.entries.remaining(DAY, Category::Mech).await.unwrap().used, 0);
}

#[tokio::test]
async fn text_edits_on_an_overbooked_bucket_are_allowed() {
    let db = memory_db().await;
    let svc = services(&db, PlannerConfig::default());
    let jonas = hire(&svc, "Jonas", Category::Mech, 100).await;

    let e = svc.entries.create(entry(DAY, Category::Mech, 96)).await.unwrap();
    svc.employees
        .update(
            jonas,
            EmployeePatch {
                performance: Some(50),
                ..EmployeePatch::default()
            },
        )
        .await
        .unwrap();

    let bucket = svc.entries.remaining(DAY, Category::Mech).await.unwrap();
    assert!(bucket.is_overbooked());
    assert_eq!((bucket.delta(), bucket.remaining()), (-48, 0));

    let edited = svc
        .entries
        .update(
            e.id,
            DayEntryPatch {
                title: Some(None),
                pick_up: Some(Some("16:30".to_owned())),
                aw: Some(90),
                ..DayEntryPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(edited.title, None);
    assert_eq!(edited.pick_up.as_deref(), Some("16:30"));
    assert_eq!(edited.aw, 90);
    assert_eq!(edited.created_at, e.created_at);
}

#[tokio::test]
async fn update_of_missing_entry_is_not_found() {
    let db = memory_db().await;
    let svc = services(&db, PlannerConfig::default());
    let err = svc
        .entries
        .update(
            uuid::Uuid::now_v7(),
            DayEntryPatch {
                work_text: Some("x".to_owned()),
                ..DayEntryPatch::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound { entity: "day entry", .. }));
}

#[tokio::test]
async fn delete_is_idempotent() {
    let db = memory_db().await;
    let svc = services(&db, PlannerConfig::default());
    let e = svc.entries.create(entry(DAY, Category::Mech, 0)).await.unwrap();

    assert!(svc.entries.delete(e.id).await.unwrap());
    assert!(!svc.entries.delete(e.id).await.unwrap());
    assert!(svc.entries.list(Some(DAY), Some(DAY)).await.unwrap().is_empty());
}

#[tokio::test]
async fn list_orders_by_day_then_creation() {
    let db = memory_db().await;
    let svc = services(&db, PlannerConfig::default());
    let later = svc
        .entries
        .create(entry(date!(2025 - 03 - 08), Category::Mech, 0))
        .await
        .unwrap();
    let first = svc.entries.create(entry(DAY, Category::Body, 0)).await.unwrap();
    let second = svc.entries.create(entry(DAY, Category::Mech, 0)).await.unwrap();
    svc.entries
        .create(entry(date!(2025 - 03 - 09), Category::Mech, 0))
        .await
        .unwrap();

    let ids: Vec<_> = svc
        .entries
        .list(Some(DAY), Some(date!(2025 - 03 - 08)))
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.id)
        .collect();
    assert_eq!(ids, vec![first.id, second.id, later.id]);
}

#[tokio::test]
async fn list_rejects_bad_ranges() {
    let db = memory_db().await;
    let svc = services(
        &db,
        PlannerConfig {
            max_range_days: 7,
            ..PlannerConfig::default()
        },
    );

    let missing = svc.entries.list(Some(DAY), None).await.unwrap_err();
    let DomainError::Validation { issues } = missing else {
        panic!("expected validation error");
    };
    assert_eq!(issues[0].field, "to");

    assert!(matches!(
        svc.entries.list(Some(DAY), Some(date!(2025 - 03 - 06))).await,
        Err(DomainError::Validation { .. })
    ));
    assert!(svc.entries.list(Some(DAY), Some(date!(2025 - 03 - 13))).await.is_ok());
    assert!(matches!(
        svc.entries.list(Some(DAY), Some(date!(2025 - 03 - 14))).await,
        Err(DomainError::Validation { .. })
    ));
}

#[tokio::test]
async fn availability_covers_every_day_and_category() {
    let db = memory_db().await;
    let svc = services(&db, PlannerConfig::default());
    hire(&svc, "Jonas", Category::Mech, 100).await;
    hire(&svc, "Ali", Category::Mech, 120).await;
    svc.entries.create(entry(DAY, Category::Mech, 100)).await.unwrap();

    let days = svc
        .entries
        .daily_availability(Some(DAY), Some(date!(2025 - 03 - 09)))
        .await
        .unwrap();
    assert_eq!(days.len(), 3);
    assert!(days.iter().all(|d| d.categories.len() == 3));

    let mech = days[0].categories[&Category::Mech];
    assert_eq!((mech.capacity, mech.used, mech.remaining()), (211, 100, 111));
    assert_eq!(days[1].categories[&Category::Mech].used, 0);
    assert_eq!(days[2].categories[&Category::Body].capacity, 0);
}

#[tokio::test]
async fn capacity_window_uses_the_live_roster() {
    let db = memory_db().await;
    let svc = services(&db, PlannerConfig::default());
    hire(&svc, "Jonas", Category::Mech, 100).await;
    hire(&svc, "Ida", Category::Prep, 75).await;

    let days = svc.capacity.capacity_days(DAY, None).await.unwrap();
    assert_eq!(days.len(), 5);
    assert_eq!(days[4].date, date!(2025 - 03 - 11));
    let prep = days[0].categories[&Category::Prep];
    assert_eq!((prep.aw, prep.minutes), (72, 360));
    assert_eq!(days[0].categories[&Category::Body].aw, 0);

    assert!(svc.capacity.capacity_days(DAY, Some(0)).await.is_err());
    assert!(svc.capacity.capacity_days(DAY, Some(32)).await.is_err());
}

#[tokio::test]
async fn employee_validation_and_removal() {
    let db = memory_db().await;
    let svc = services(&db, PlannerConfig::default());

    let err = svc
        .employees
        .create(NewEmployee {
            name: "   ".to_owned(),
            category: Category::Body,
            performance: 301,
        })
        .await
        .unwrap_err();
    let DomainError::Validation { issues } = err else {
        panic!("expected validation error");
    };
    let fields: Vec<_> = issues.iter().map(|i| i.field.as_str()).collect();
    assert_eq!(fields, vec!["name", "performance"]);

    let id = hire(&svc, "  Mia  ", Category::Body, 110).await;
    let listed = svc.employees.list().await.unwrap();
    assert_eq!(listed[0].name, "Mia");
    assert_eq!(svc.capacity.capacity_for_category(Category::Body).await.unwrap(), 106);

    assert!(svc.employees.delete(id).await.unwrap());
    assert!(!svc.employees.delete(id).await.unwrap());
    assert_eq!(svc.capacity.capacity_for_category(Category::Body).await.unwrap(), 0);
}
