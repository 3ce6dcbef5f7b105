use assert_cmd::prelude::*;
use std::process::Command;

#[test]
fn serve_refuses_non_loopback_without_public() {
    Command::new(assert_cmd::cargo::cargo_bin!("contacts"))
        .args(["serve", "--bind", "0.0.0.0:0"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("Refusing to bind"));
}

#[test]
fn serve_fails_on_corrupt_db() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("contacts.json");
    std::fs::write(&db, "{ not a contact list").unwrap();

    Command::new(assert_cmd::cargo::cargo_bin!("contacts"))
        .env_remove("CONTACTS_DB")
        .args(["serve", "--bind", "127.0.0.1:0", "--db"])
        .arg(&db)
        .assert()
        .failure()
        .stderr(predicates::str::contains("error loading contacts DB"));
}

#[test]
fn help_lists_serve_flags() {
    Command::new(assert_cmd::cargo::cargo_bin!("contacts"))
        .args(["serve", "--help"])
        .assert()
        .success()
        .stdout(predicates::str::contains("--archive-step-ms"))
        .stdout(predicates::str::contains("CONTACTS_DB"));
}
