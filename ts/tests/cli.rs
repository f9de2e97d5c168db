//! Integration tests for the ts maintenance binary

use assert_cmd::Command;
use predicates::prelude::*;

fn ts_cmd(db: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("ts").unwrap();
    cmd.arg("--db").arg(db);
    cmd
}

#[test]
fn test_stats_on_fresh_database() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("trips.db");

    ts_cmd(&db)
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Trips: 0"))
        .stdout(predicate::str::contains("trip_history"));
}

#[test]
fn test_trips_empty_then_populated() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("trips.db");

    ts_cmd(&db)
        .args(["trips", "--user", "default_user"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No trips recorded"));

    // Populate through the library, then read back through the binary
    let store = tripstore::TripStore::open(&db).unwrap();
    store
        .append_trip(
            "default_user",
            tripstore::NewTrip {
                destination: "Paris, France".into(),
                start_date: "2025-06-01".into(),
                end_date: "2025-06-07".into(),
                budget: "moderate".into(),
                ..Default::default()
            },
        )
        .unwrap();
    drop(store);

    ts_cmd(&db)
        .args(["search", "par"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Paris, France"));
}

#[test]
fn test_conversations_rejects_unknown_agent() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("trips.db");

    ts_cmd(&db)
        .args(["conversations", "--agent", "pilot"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown agent type"));
}
