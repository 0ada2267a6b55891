use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::path::PathBuf;
use std::process::Command;
use tempfile::tempdir;

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/profile.json")
}

#[test]
fn cli_shows_help() {
    let mut cmd = Command::cargo_bin("xpboard").unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("render"))
        .stdout(predicate::str::contains("login"));
}

#[test]
fn render_from_saved_response() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("charts");
    let json = dir.path().join("dashboard.json");
    let csv = dir.path().join("series.csv");
    let mut cmd = Command::cargo_bin("xpboard").unwrap();
    cmd.env_remove("XPBOARD_TOKEN")
        .arg("render")
        .arg("--input")
        .arg(fixture())
        .arg("--out-dir")
        .arg(&out)
        .args(["--width", "640", "--curve", "linear", "--responsive-padding"])
        .arg("--json")
        .arg(&json)
        .arg("--csv")
        .arg(&csv);
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Wrote 5 charts"));

    assert!(out.join("pass_fail.svg").exists());
    assert!(json.exists());
    let series = std::fs::read_to_string(&csv).unwrap();
    assert_eq!(series.lines().count(), 4);
}

#[test]
fn summary_from_saved_response() {
    let mut cmd = Command::cargo_bin("xpboard").unwrap();
    cmd.env_remove("XPBOARD_TOKEN")
        .arg("summary")
        .arg("--input")
        .arg(fixture());
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Amina"))
        .stdout(predicate::str::contains("ratio 2.0"))
        .stdout(predicate::str::contains("2 pass / 1 fail"));
}

#[test]
fn summary_without_token_fails() {
    let mut cmd = Command::cargo_bin("xpboard").unwrap();
    cmd.env_remove("XPBOARD_TOKEN")
        .env_remove("XPBOARD_PASSWORD")
        .arg("summary");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("no token found"));
}

#[test]
fn rejects_malformed_start_date() {
    let mut cmd = Command::cargo_bin("xpboard").unwrap();
    cmd.args(["render", "--start-date", "yesterday"]).arg("--input").arg(fixture());
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("invalid date"));
}

#[test]
fn event_id_is_a_number_defaulting_to_75() {
    let mut cmd = Command::cargo_bin("xpboard").unwrap();
    cmd.args(["summary", "--help"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("--event-id"))
        .stdout(predicate::str::contains("[default: 75]"));

    let mut cmd = Command::cargo_bin("xpboard").unwrap();
    cmd.args(["summary", "--event-id", "div-01"]).arg("--input").arg(fixture());
    cmd.assert().failure().stderr(predicate::str::contains("--event-id"));
}
