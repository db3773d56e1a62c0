//! End-to-end resolution tests over fixture artifacts
//!
//! Drives the `resolve` subcommand against the sample assignment table
//! and checks the full taxonomy: success, unknown user, invalid input,
//! catalog inconsistency, and missing artifacts.

use assert_cmd::Command;
use predicates::prelude::*;

mod common;

fn service_cmd() -> Command {
    Command::cargo_bin("learnstyle-service").unwrap()
}

// ─────────────────────────────────────────────────────────────────
// Success Path
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_resolve_known_user() {
    let fixture = common::ConfigFixture::with_fixture_artifacts();

    let output = service_cmd()
        .arg("resolve")
        .arg("42")
        .arg("--config")
        .arg(fixture.path())
        .assert()
        .success();

    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();

    assert_eq!(json["user_id"], 42);
    assert_eq!(json["cluster"], 1);
    assert_eq!(json["persona_name"], "Si Penjelajah Ahli");
    assert_eq!(
        json["persona_description"],
        "Sangat aktif, menjelajahi banyak topik, dan tetap menyelesaikan video."
    );
}

#[test]
fn test_resolve_covers_every_fixture_cluster() {
    let fixture = common::ConfigFixture::with_fixture_artifacts();

    for (user_id, persona_name) in [
        ("7", "Si Penyelesai Efisien"),
        ("42", "Si Penjelajah Ahli"),
        ("101", "Si 'Drop-off'"),
        ("256", "Si Pelajar Mendalam"),
    ] {
        service_cmd()
            .arg("resolve")
            .arg(user_id)
            .arg("--config")
            .arg(fixture.path())
            .assert()
            .success()
            .stdout(predicate::str::contains(persona_name));
    }
}

#[test]
fn test_resolve_is_repeatable() {
    let fixture = common::ConfigFixture::with_fixture_artifacts();

    let run = || {
        let output = service_cmd()
            .arg("resolve")
            .arg("1001")
            .arg("--config")
            .arg(fixture.path())
            .assert()
            .success();
        output.get_output().stdout.clone()
    };

    // Byte-identical output across invocations
    assert_eq!(run(), run());
}

// ─────────────────────────────────────────────────────────────────
// Failure Taxonomy
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_resolve_unknown_user() {
    let fixture = common::ConfigFixture::with_fixture_artifacts();

    service_cmd()
        .arg("resolve")
        .arg("9999")
        .arg("--config")
        .arg(fixture.path())
        .assert()
        .failure()
        .code(40)
        .stderr(predicate::str::contains("E401"))
        .stderr(predicate::str::contains("no recorded cluster assignment"));
}

#[test]
fn test_resolve_negative_user_id() {
    let fixture = common::ConfigFixture::with_fixture_artifacts();

    service_cmd()
        .arg("resolve")
        .arg("-5")
        .arg("--config")
        .arg(fixture.path())
        .assert()
        .failure()
        .code(40)
        .stderr(predicate::str::contains("E400"))
        .stderr(predicate::str::contains("non-negative"));
}

#[test]
fn test_resolve_catalog_inconsistency() {
    // User 256 sits in cluster 3, which the override catalog omits.
    let fixture = common::ConfigFixture::with_incomplete_catalog();

    service_cmd()
        .arg("resolve")
        .arg("256")
        .arg("--config")
        .arg(fixture.path())
        .assert()
        .failure()
        .code(40)
        .stderr(predicate::str::contains("E402"));
}

#[test]
fn test_resolve_with_missing_artifacts() {
    let fixture = common::ConfigFixture::with_missing_assignments();

    service_cmd()
        .arg("resolve")
        .arg("42")
        .arg("--config")
        .arg(fixture.path())
        .assert()
        .failure()
        .code(30)
        .stderr(predicate::str::contains("E300"));
}
