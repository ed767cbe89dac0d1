//! Lab booking workflow and slot uniqueness

mod common;

use arena_core::{BookingInput, ErrorCode, LabField, LabSpec, SearchFilter, TeamInput};
use arena_db::entities::lab_booking;
use common::*;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};

async fn team_for(service: &arena_core::ArenaService, who: &arena_core::Identity, name: &str) -> i32 {
    created(
        service
            .create_team(
                who,
                TeamInput {
                    name: name.to_string(),
                },
            )
            .await
            .unwrap(),
    )
}

fn booking(lab_id: i32, team_id: i32, day: chrono::NaiveDate) -> BookingInput {
    BookingInput {
        lab_id,
        team_id,
        booking_date: day,
    }
}

#[tokio::test]
async fn test_same_lab_same_day_is_slot_taken() {
    let service = setup().await;
    let alice = signed_in(&service, "alice").await;
    let bob = signed_in(&service, "bob").await;
    let lab1 = lab(&service, "Lab #1").await;
    let red = team_for(&service, &alice, "Red").await;
    let blue = team_for(&service, &bob, "Blue").await;

    created(
        service
            .create_booking(&alice, booking(lab1, red, date(2025, 5, 1)))
            .await
            .unwrap(),
    );

    let clash = service
        .create_booking(&bob, booking(lab1, blue, date(2025, 5, 1)))
        .await
        .unwrap();
    assert_rejected(&clash, ErrorCode::SlotTaken);

    created(
        service
            .create_booking(&bob, booking(lab1, blue, date(2025, 5, 2)))
            .await
            .unwrap(),
    );
}

#[tokio::test]
async fn test_concurrent_bookings_of_one_slot_yield_one_winner() {
    let service = setup().await;
    let alice = signed_in(&service, "alice").await;
    let bob = signed_in(&service, "bob").await;
    let lab1 = lab(&service, "Lab #1").await;
    let red = team_for(&service, &alice, "Red").await;
    let blue = team_for(&service, &bob, "Blue").await;

    let (first, second) = tokio::join!(
        service.create_booking(&alice, booking(lab1, red, date(2025, 6, 1))),
        service.create_booking(&bob, booking(lab1, blue, date(2025, 6, 1))),
    );
    let outcomes = [first.unwrap(), second.unwrap()];

    let winners = outcomes.iter().filter(|o| o.success).count();
    assert_eq!(winners, 1);
    let loser = outcomes.iter().find(|o| !o.success).unwrap();
    assert_eq!(loser.code, Some(ErrorCode::SlotTaken));

    let rows = lab_booking::Entity::find()
        .filter(lab_booking::Column::LabId.eq(lab1))
        .count(service.db())
        .await
        .unwrap();
    assert_eq!(rows, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_bookings_on_separate_connections_keep_one_per_slot() {
    let (service, _dir) = setup_file_backed().await;
    let lab1 = lab(&service, "Lab #1").await;

    let mut captains = Vec::new();
    for n in 0..6 {
        let captain = signed_in(&service, &format!("captain{}", n)).await;
        let team = team_for(&service, &captain, &format!("Squad {}", n)).await;
        captains.push((captain, team));
    }

    let attempts: Vec<_> = captains
        .into_iter()
        .map(|(captain, team)| {
            let service = service.clone();
            tokio::spawn(async move {
                service
                    .create_booking(&captain, booking(lab1, team, date(2025, 6, 1)))
                    .await
            })
        })
        .collect();

    let mut outcomes = Vec::new();
    for attempt in attempts {
        outcomes.push(attempt.await.unwrap().unwrap());
    }

    // Single-statement inserts queue on the file lock; the unique index picks the winner
    assert_eq!(outcomes.iter().filter(|o| o.success).count(), 1, "{:?}", outcomes);
    assert!(outcomes
        .iter()
        .filter(|o| !o.success)
        .all(|o| o.code == Some(ErrorCode::SlotTaken)));

    let rows = lab_booking::Entity::find()
        .filter(lab_booking::Column::LabId.eq(lab1))
        .count(service.db())
        .await
        .unwrap();
    assert_eq!(rows, 1);
}

#[tokio::test]
async fn test_booking_requires_team_membership() {
    let service = setup().await;
    let alice = signed_in(&service, "alice").await;
    let mallory = signed_in(&service, "mallory").await;
    let lab1 = lab(&service, "Lab #1").await;
    let red = team_for(&service, &alice, "Red").await;

    let outcome = service
        .create_booking(&mallory, booking(lab1, red, date(2025, 5, 1)))
        .await
        .unwrap();
    assert_rejected(&outcome, ErrorCode::Forbidden);
}

#[tokio::test]
async fn test_booking_unknown_lab_or_team_is_not_found() {
    let service = setup().await;
    let alice = signed_in(&service, "alice").await;
    let lab1 = lab(&service, "Lab #1").await;
    let red = team_for(&service, &alice, "Red").await;

    assert_rejected(
        &service
            .create_booking(&alice, booking(999, red, date(2025, 5, 1)))
            .await
            .unwrap(),
        ErrorCode::NotFound,
    );
    assert_rejected(
        &service
            .create_booking(&alice, booking(lab1, 999, date(2025, 5, 1)))
            .await
            .unwrap(),
        ErrorCode::NotFound,
    );
}

#[tokio::test]
async fn test_only_booker_may_update_or_delete() {
    let service = setup().await;
    let alice = signed_in(&service, "alice").await;
    let bob = signed_in(&service, "bob").await;
    let lab1 = lab(&service, "Lab #1").await;
    let red = team_for(&service, &alice, "Red").await;
    assert_ok(&service.join_team(&bob, red).await.unwrap());

    let id = created(
        service
            .create_booking(&alice, booking(lab1, red, date(2025, 5, 1)))
            .await
            .unwrap(),
    );

    assert_rejected(
        &service
            .update_booking(&bob, id, booking(lab1, red, date(2025, 5, 3)))
            .await
            .unwrap(),
        ErrorCode::Forbidden,
    );
    assert_rejected(
        &service.delete_booking(&bob, id).await.unwrap(),
        ErrorCode::Forbidden,
    );

    assert_ok(&service.delete_booking(&alice, id).await.unwrap());
    assert_rejected(
        &service.delete_booking(&alice, id).await.unwrap(),
        ErrorCode::NotFound,
    );
}

#[tokio::test]
async fn test_update_revalidates_slot_uniqueness() {
    let service = setup().await;
    let alice = signed_in(&service, "alice").await;
    let lab1 = lab(&service, "Lab #1").await;
    let red = team_for(&service, &alice, "Red").await;

    created(
        service
            .create_booking(&alice, booking(lab1, red, date(2025, 5, 1)))
            .await
            .unwrap(),
    );
    let second = created(
        service
            .create_booking(&alice, booking(lab1, red, date(2025, 5, 2)))
            .await
            .unwrap(),
    );

    let moved = service
        .update_booking(&alice, second, booking(lab1, red, date(2025, 5, 1)))
        .await
        .unwrap();
    assert_rejected(&moved, ErrorCode::SlotTaken);

    assert_ok(
        &service
            .update_booking(&alice, second, booking(lab1, red, date(2025, 5, 9)))
            .await
            .unwrap(),
    );
}

#[tokio::test]
async fn test_my_bookings_joins_names_and_skips_past() {
    let service = setup().await;
    let alice = signed_in(&service, "alice").await;
    let lab1 = lab(&service, "Lab #1").await;
    let red = team_for(&service, &alice, "Red").await;

    created(
        service
            .create_booking(&alice, booking(lab1, red, date(2025, 4, 1)))
            .await
            .unwrap(),
    );
    created(
        service
            .create_booking(&alice, booking(lab1, red, date(2025, 5, 1)))
            .await
            .unwrap(),
    );

    let upcoming = service.my_bookings(&alice, date(2025, 4, 15)).await.unwrap();
    assert_eq!(upcoming.len(), 1);
    assert_eq!(upcoming[0].booking_date, date(2025, 5, 1));
    assert_eq!(upcoming[0].lab_name, "Lab #1");
    assert_eq!(upcoming[0].team_name, "Red");
    assert_eq!(upcoming[0].booked_by_name, "Player ALICE");
}

#[tokio::test]
async fn test_available_labs_exclude_booked_ones_for_that_day() {
    let service = setup().await;
    let alice = signed_in(&service, "alice").await;
    let lab1 = lab(&service, "Lab A").await;
    let lab2 = lab(&service, "Lab B").await;
    let red = team_for(&service, &alice, "Red").await;

    created(
        service
            .create_booking(&alice, booking(lab1, red, date(2025, 5, 1)))
            .await
            .unwrap(),
    );

    let free: Vec<i32> = service
        .available_labs(&alice, date(2025, 5, 1), None)
        .await
        .unwrap()
        .iter()
        .map(|l| l.id)
        .collect();
    assert_eq!(free, vec![lab2]);

    let next_day = service
        .available_labs(&alice, date(2025, 5, 2), None)
        .await
        .unwrap();
    assert_eq!(next_day.len(), 2);

    let filter = SearchFilter::new(LabField::Description, "lab b");
    let filtered = service
        .available_labs(&alice, date(2025, 5, 2), Some(&filter))
        .await
        .unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].id, lab2);
}

#[tokio::test]
async fn test_register_lab_upserts_by_name() {
    let service = setup().await;
    let alice = signed_in(&service, "alice").await;

    let first = service
        .register_lab(LabSpec {
            name: "Lab A".to_string(),
            computer_count: 10,
            description: None,
        })
        .await
        .unwrap();
    let second = service
        .register_lab(LabSpec {
            name: "Lab A".to_string(),
            computer_count: 32,
            description: Some("Upgraded".to_string()),
        })
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    let labs = service.list_labs(&alice).await.unwrap();
    assert_eq!(labs.len(), 1);
    assert_eq!(labs[0].computer_count, 32);
    assert_eq!(labs[0].description.as_deref(), Some("Upgraded"));
}
