//! Smoke tests to verify command module wiring

use assert_cmd::Command;
use predicates::prelude::*;

/// Run from an empty directory so no stray `.env` is picked up.
fn devevents(dir: &tempfile::TempDir) -> Command {
    let mut cmd = Command::cargo_bin("devevents").unwrap();
    cmd.current_dir(dir.path()).env_remove("DATABASE_URL");
    cmd
}

// === Normalize Command Tests ===

#[test]
fn test_normalize_slug() {
    let dir = tempfile::tempdir().unwrap();
    devevents(&dir)
        .args(["normalize", "slug", "Hello World!"])
        .assert()
        .success()
        .stdout("hello-world\n");
}

#[test]
fn test_normalize_midnight() {
    let dir = tempfile::tempdir().unwrap();
    devevents(&dir)
        .args(["normalize", "time", "12:00 AM"])
        .assert()
        .success()
        .stdout("00:00\n");
}

#[test]
fn test_normalize_date_long_form() {
    let dir = tempfile::tempdir().unwrap();
    devevents(&dir)
        .args(["normalize", "date", "March 22, 2024"])
        .assert()
        .success()
        .stdout("2024-03-22\n");
}

#[test]
fn test_normalize_punctuation_slug_fails() {
    let dir = tempfile::tempdir().unwrap();
    devevents(&dir)
        .args(["normalize", "slug", "!!!"])
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("title: must contain at least one"));
}

#[test]
fn test_normalize_bad_time_fails() {
    let dir = tempfile::tempdir().unwrap();
    devevents(&dir)
        .args(["normalize", "time", "9:5 AM"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid time format"));
}

// === Database Command Tests ===

#[test]
fn test_event_show_without_database_url() {
    let dir = tempfile::tempdir().unwrap();
    devevents(&dir)
        .args(["event", "show", "devops-days"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("DATABASE_URL"));
}

#[test]
fn test_booking_list_requires_a_filter() {
    let dir = tempfile::tempdir().unwrap();
    devevents(&dir)
        .args(["booking", "list"])
        .assert()
        .failure();
}

// === Help Tests ===

#[test]
fn test_event_create_help() {
    let dir = tempfile::tempdir().unwrap();
    devevents(&dir)
        .args(["event", "create", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Path to the event JSON"));
}

#[test]
fn test_event_list_help() {
    let dir = tempfile::tempdir().unwrap();
    devevents(&dir)
        .args(["event", "list", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("online, offline, hybrid"));
}
