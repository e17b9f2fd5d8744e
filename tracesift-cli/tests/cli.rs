use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;

const REPORT: &str = "
- id: GID-1
  object_type: Requirement
  title: REQ-1
  location: [Project]
  fields: {Status: Open}
  tags: [safety]
  created_at: 2024-01-10T08:00:00Z
  modified_at: 2024-01-11T08:00:00Z
  upstream: []
  downstream: []
- id: GID-2
  object_type: Test Case
  title: TC-1
  location: [Project, Tests]
  fields: {}
  tags: []
  created_at: 2024-02-01T08:00:00Z
  modified_at: 2024-02-01T08:00:00Z
  upstream: []
  downstream: []
";

const FILTER: &str = "main: {type: Requirement}\n";

fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn apply_prints_matching_items() {
    let dir = tempfile::tempdir().unwrap();
    let filter = write_file(&dir, "filter.yaml", FILTER);
    let report = write_file(&dir, "report.yaml", REPORT);

    Command::cargo_bin("tracesift")
        .unwrap()
        .args(["apply", "--filter"])
        .arg(&filter)
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::contains("GID-1"))
        .stdout(predicate::str::contains("GID-2").not())
        .stdout(predicate::str::contains("Matched 1 of 2 items"));
}

#[test]
fn apply_ids_format_prints_ids_only() {
    let dir = tempfile::tempdir().unwrap();
    let filter = write_file(&dir, "filter.yaml", FILTER);
    let report = write_file(&dir, "report.yaml", REPORT);

    Command::cargo_bin("tracesift")
        .unwrap()
        .args(["apply", "--format", "ids", "--filter"])
        .arg(&filter)
        .arg(&report)
        .assert()
        .success()
        .stdout("GID-1\n");
}

#[test]
fn check_accepts_a_valid_filter() {
    let dir = tempfile::tempdir().unwrap();
    let filter = write_file(&dir, "filter.yaml", FILTER);

    Command::cargo_bin("tracesift")
        .unwrap()
        .arg("check")
        .arg(&filter)
        .assert()
        .success()
        .stdout(predicate::str::contains("valid"));
}

#[test]
fn check_rejects_a_contradictory_filter() {
    let dir = tempfile::tempdir().unwrap();
    let filter = write_file(
        &dir,
        "filter.yaml",
        "main:\n  downstream items: {all match: passed, count: {is: 1}}\npassed:\n  field: {name: Result}\n",
    );

    Command::cargo_bin("tracesift")
        .unwrap()
        .arg("check")
        .arg(&filter)
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be combined"));
}

#[test]
fn apply_fails_on_missing_report() {
    let dir = tempfile::tempdir().unwrap();
    let filter = write_file(&dir, "filter.yaml", FILTER);

    Command::cargo_bin("tracesift")
        .unwrap()
        .args(["apply", "--filter"])
        .arg(&filter)
        .arg(dir.path().join("missing.yaml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing.yaml"));
}
