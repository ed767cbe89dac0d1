//! Watch-party seats, capacity and cascades

mod common;

use arena_core::{
    ChangeAction, Collection, ErrorCode, SearchFilter, WatchPartyField, WatchPartyInput,
    DEFAULT_LOCATION, DEFAULT_MAX_ATTENDEES,
};
use arena_db::entities::{watch_party, watch_party_attendee};
use common::*;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};

async fn party_with_capacity(
    service: &arena_core::ArenaService,
    organizer: &arena_core::Identity,
    max: i32,
) -> (i32, i32) {
    let tournament_id = created(
        service
            .create_tournament(organizer, tournament_input("Spring Cup"))
            .await
            .unwrap(),
    );
    let party_id = created(
        service
            .create_watch_party(organizer, party_input(tournament_id, max))
            .await
            .unwrap(),
    );
    (tournament_id, party_id)
}

#[tokio::test]
async fn test_capacity_of_two_refuses_third_attendee() {
    let service = setup().await;
    let alice = signed_in(&service, "alice").await;
    let bob = signed_in(&service, "bob").await;
    let carol = signed_in(&service, "carol").await;
    let (_, party) = party_with_capacity(&service, &alice, 2).await;

    assert_eq!(service.attendee_count(&alice, party).await.unwrap(), 1);

    assert_ok(&service.join_watch_party(&bob, party).await.unwrap());
    assert_eq!(service.attendee_count(&alice, party).await.unwrap(), 2);

    let full = service.join_watch_party(&carol, party).await.unwrap();
    assert_rejected(&full, ErrorCode::AtCapacity);
    assert_eq!(
        full.error.as_deref(),
        Some("This watch party is at maximum capacity")
    );
    assert_eq!(service.attendee_count(&alice, party).await.unwrap(), 2);
}

#[tokio::test]
async fn test_concurrent_joins_never_exceed_capacity() {
    let service = setup().await;
    let alice = signed_in(&service, "alice").await;
    let bob = signed_in(&service, "bob").await;
    let carol = signed_in(&service, "carol").await;
    let dave = signed_in(&service, "dave").await;
    let (_, party) = party_with_capacity(&service, &alice, 2).await;

    let (b, c, d) = tokio::join!(
        service.join_watch_party(&bob, party),
        service.join_watch_party(&carol, party),
        service.join_watch_party(&dave, party),
    );
    let outcomes = [b.unwrap(), c.unwrap(), d.unwrap()];

    assert_eq!(outcomes.iter().filter(|o| o.success).count(), 1);
    assert!(outcomes
        .iter()
        .filter(|o| !o.success)
        .all(|o| o.code == Some(ErrorCode::AtCapacity)));

    let seated = watch_party_attendee::Entity::find()
        .filter(watch_party_attendee::Column::WatchPartyId.eq(party))
        .count(service.db())
        .await
        .unwrap();
    assert_eq!(seated, 2);

    let row = watch_party::Entity::find_by_id(party)
        .one(service.db())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.seats_taken, 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_joins_on_separate_connections_never_exceed_capacity() {
    let (service, _dir) = setup_file_backed().await;
    let alice = signed_in(&service, "alice").await;
    let (_, party) = party_with_capacity(&service, &alice, 3).await;

    let mut fans = Vec::new();
    for n in 0..8 {
        fans.push(signed_in(&service, &format!("fan{}", n)).await);
    }

    let joins: Vec<_> = fans
        .into_iter()
        .map(|fan| {
            let service = service.clone();
            tokio::spawn(async move { service.join_watch_party(&fan, party).await })
        })
        .collect();

    let mut outcomes = Vec::new();
    for join in joins {
        outcomes.push(join.await.unwrap().unwrap());
    }

    // Contended writers may also be turned away by a locked database file
    let seated_fans = outcomes.iter().filter(|o| o.success).count() as u64;
    assert!((1..=2).contains(&seated_fans), "{:?}", outcomes);
    assert!(outcomes.iter().filter(|o| !o.success).all(|o| matches!(
        o.code,
        Some(ErrorCode::AtCapacity) | Some(ErrorCode::StoreFailure)
    )));

    let seated = watch_party_attendee::Entity::find()
        .filter(watch_party_attendee::Column::WatchPartyId.eq(party))
        .count(service.db())
        .await
        .unwrap();
    let row = watch_party::Entity::find_by_id(party)
        .one(service.db())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(seated, 1 + seated_fans);
    assert_eq!(row.seats_taken as u64, seated);
    assert!(row.seats_taken <= row.max_attendees);
}

#[tokio::test]
async fn test_join_twice_is_already_linked() {
    let service = setup().await;
    let alice = signed_in(&service, "alice").await;
    let bob = signed_in(&service, "bob").await;
    let (_, party) = party_with_capacity(&service, &alice, 10).await;

    assert_ok(&service.join_watch_party(&bob, party).await.unwrap());
    assert_rejected(
        &service.join_watch_party(&bob, party).await.unwrap(),
        ErrorCode::AlreadyLinked,
    );
    assert_eq!(service.attendee_count(&bob, party).await.unwrap(), 2);
}

#[tokio::test]
async fn test_join_unknown_party_is_not_found() {
    let service = setup().await;
    let bob = signed_in(&service, "bob").await;

    assert_rejected(
        &service.join_watch_party(&bob, 77).await.unwrap(),
        ErrorCode::NotFound,
    );
}

#[tokio::test]
async fn test_organizer_cannot_leave_and_leaving_frees_a_seat() {
    let service = setup().await;
    let alice = signed_in(&service, "alice").await;
    let bob = signed_in(&service, "bob").await;
    let carol = signed_in(&service, "carol").await;
    let (_, party) = party_with_capacity(&service, &alice, 2).await;

    let outcome = service.leave_watch_party(&alice, party).await.unwrap();
    assert_rejected(&outcome, ErrorCode::OwnerCannotLeave);
    assert_eq!(service.attendee_count(&alice, party).await.unwrap(), 1);

    assert_ok(&service.join_watch_party(&bob, party).await.unwrap());
    assert_ok(&service.leave_watch_party(&bob, party).await.unwrap());
    assert_rejected(
        &service.leave_watch_party(&bob, party).await.unwrap(),
        ErrorCode::NotLinked,
    );

    // Bob's seat went back to the pool
    assert_ok(&service.join_watch_party(&carol, party).await.unwrap());
}

#[tokio::test]
async fn test_create_uses_defaults_and_validates_time() {
    let service = setup().await;
    let alice = signed_in(&service, "alice").await;
    let tournament_id = created(
        service
            .create_tournament(&alice, tournament_input("Cup"))
            .await
            .unwrap(),
    );

    let party = created(
        service
            .create_watch_party(
                &alice,
                WatchPartyInput {
                    tournament_id,
                    date: date(2030, 5, 1),
                    time: "19:45".to_string(),
                    location: None,
                    max_attendees: None,
                },
            )
            .await
            .unwrap(),
    );

    let mine = service.my_watch_parties(&alice).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].id, party);
    assert_eq!(mine[0].location, DEFAULT_LOCATION);
    assert_eq!(mine[0].max_attendees, DEFAULT_MAX_ATTENDEES);
    assert_eq!(mine[0].tournament_name, "Cup");
    assert_eq!(
        mine[0].party_date_time.to_rfc3339(),
        "2030-05-01T19:45:00+00:00"
    );
    assert!(mine[0].is_creator);

    let mut bad = party_input(tournament_id, 5);
    bad.time = "7pm".to_string();
    assert_rejected(
        &service.create_watch_party(&alice, bad).await.unwrap(),
        ErrorCode::InvalidInput,
    );

    assert_rejected(
        &service
            .create_watch_party(&alice, party_input(999, 5))
            .await
            .unwrap(),
        ErrorCode::NotFound,
    );
}

#[tokio::test]
async fn test_update_rejects_capacity_below_occupancy() {
    let service = setup().await;
    let alice = signed_in(&service, "alice").await;
    let bob = signed_in(&service, "bob").await;
    let carol = signed_in(&service, "carol").await;
    let (tournament_id, party) = party_with_capacity(&service, &alice, 5).await;
    assert_ok(&service.join_watch_party(&bob, party).await.unwrap());
    assert_ok(&service.join_watch_party(&carol, party).await.unwrap());

    let shrink = service
        .update_watch_party(&alice, party, party_input(tournament_id, 2))
        .await
        .unwrap();
    assert_rejected(&shrink, ErrorCode::InvalidInput);

    assert_ok(
        &service
            .update_watch_party(&alice, party, party_input(tournament_id, 3))
            .await
            .unwrap(),
    );
    assert_rejected(
        &service
            .update_watch_party(&bob, party, party_input(tournament_id, 10))
            .await
            .unwrap(),
        ErrorCode::Forbidden,
    );
}

#[tokio::test]
async fn test_delete_party_removes_attendees() {
    let service = setup().await;
    let alice = signed_in(&service, "alice").await;
    let bob = signed_in(&service, "bob").await;
    let (_, party) = party_with_capacity(&service, &alice, 5).await;
    assert_ok(&service.join_watch_party(&bob, party).await.unwrap());

    assert_rejected(
        &service.delete_watch_party(&bob, party).await.unwrap(),
        ErrorCode::Forbidden,
    );

    let mut events = service.subscribe();
    assert_ok(&service.delete_watch_party(&alice, party).await.unwrap());

    let orphans = watch_party_attendee::Entity::find()
        .filter(watch_party_attendee::Column::WatchPartyId.eq(party))
        .count(service.db())
        .await
        .unwrap();
    assert_eq!(orphans, 0);
    assert!(service.my_watch_parties(&bob).await.unwrap().is_empty());

    let event = events.recv().await.unwrap();
    assert_eq!(event.action, ChangeAction::Deleted);
    assert!(event.touches(Collection::WatchParties));
}

#[tokio::test]
async fn test_watch_party_partition_and_filters() {
    let service = setup().await;
    let alice = signed_in(&service, "alice").await;
    let bob = signed_in(&service, "bob").await;
    let (tournament_id, first) = party_with_capacity(&service, &alice, 5).await;

    let mut downtown = party_input(tournament_id, 5);
    downtown.location = Some("Downtown Cafe".to_string());
    downtown.date = date(2030, 6, 12);
    let second = created(service.create_watch_party(&alice, downtown).await.unwrap());
    assert_ok(&service.join_watch_party(&bob, first).await.unwrap());

    let mine: Vec<i32> = service
        .my_watch_parties(&bob)
        .await
        .unwrap()
        .iter()
        .map(|p| p.id)
        .collect();
    let available: Vec<i32> = service
        .available_watch_parties(&bob, None)
        .await
        .unwrap()
        .iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(mine, vec![first]);
    assert_eq!(available, vec![second]);

    let by_location = SearchFilter::new(WatchPartyField::Location, "cafe");
    assert_eq!(
        service
            .available_watch_parties(&bob, Some(&by_location))
            .await
            .unwrap()
            .len(),
        1
    );

    let by_date = SearchFilter::new(WatchPartyField::Date, "June 12");
    assert_eq!(
        service
            .available_watch_parties(&bob, Some(&by_date))
            .await
            .unwrap()
            .len(),
        1
    );

    let by_tournament = SearchFilter::new(WatchPartyField::Tournament, "autumn");
    assert!(service
        .available_watch_parties(&bob, Some(&by_tournament))
        .await
        .unwrap()
        .is_empty());
}
