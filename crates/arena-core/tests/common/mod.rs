//! Shared fixtures for arena-core integration tests

#![allow(dead_code)]

use arena_core::{
    sync_principal, ArenaService, ErrorCode, Identity, LabSpec, Outcome, Principal,
    TournamentInput, WatchPartyInput,
};
use chrono::NaiveDate;

/// Service over a fresh, migrated in-memory database
pub async fn setup() -> ArenaService {
    let db = arena_db::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");
    arena_db::migrate(&db).await.expect("Failed to run migrations");
    ArenaService::new(db)
}

/// Service over a migrated SQLite file with a multi-connection pool, so
/// concurrent operations run on separate connections
pub async fn setup_file_backed() -> (ArenaService, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("arena.db").display());
    let pool = arena_db::PoolConfig {
        max_connections: 8,
        ..arena_db::PoolConfig::default()
    };
    let db = arena_db::connect_with(&url, &pool)
        .await
        .expect("Failed to connect to file database");
    arena_db::migrate(&db).await.expect("Failed to run migrations");
    (ArenaService::new(db), dir)
}

/// Authenticated identity whose principal is mirrored into `users`
pub async fn signed_in(service: &ArenaService, id: &str) -> Identity {
    let principal = Principal::new(id, "Player", id.to_uppercase());
    sync_principal(service.db(), &principal)
        .await
        .expect("Failed to sync principal");
    Identity::authenticated(principal)
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub async fn lab(service: &ArenaService, name: &str) -> i32 {
    service
        .register_lab(LabSpec {
            name: name.to_string(),
            computer_count: 20,
            description: Some(format!("{} description", name)),
        })
        .await
        .expect("Failed to register lab")
        .id
}

/// Id of a successful create, panicking with the error otherwise
pub fn created(outcome: Outcome) -> i32 {
    assert!(outcome.success, "expected success, got {:?}", outcome);
    outcome.id.expect("created outcome carries an id")
}

pub fn assert_ok(outcome: &Outcome) {
    assert!(outcome.success, "expected success, got {:?}", outcome);
}

pub fn assert_rejected(outcome: &Outcome, code: ErrorCode) {
    assert!(!outcome.success, "expected {:?}, got success", code);
    assert_eq!(outcome.code, Some(code), "unexpected outcome {:?}", outcome);
    assert!(outcome.error.as_deref().is_some_and(|e| !e.is_empty()));
}

pub fn tournament_input(name: &str) -> TournamentInput {
    TournamentInput {
        name: name.to_string(),
        game: "Rocket League".to_string(),
        genre: Some("Sports".to_string()),
        date: date(2030, 5, 1),
        prize_fund: Some("$500".to_string()),
    }
}

pub fn party_input(tournament_id: i32, max_attendees: i32) -> WatchPartyInput {
    WatchPartyInput {
        tournament_id,
        date: date(2030, 5, 1),
        time: "18:00".to_string(),
        location: Some("Library".to_string()),
        max_attendees: Some(max_attendees),
    }
}
