use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;

fn fixture(path: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join(path)
}

#[test]
fn inspect_text_lists_sections_and_unparsed_lines() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("zfw-convert"));
    cmd.arg("inspect")
        .arg(fixture("fixtures/branch_zbf.txt"))
        .assert()
        .success()
        .stdout(predicate::str::contains("- zones: 3"))
        .stdout(predicate::str::contains("- zone_pairs: 3"))
        .stdout(predicate::str::contains("- DMZ-WAN"))
        .stdout(predicate::str::contains("- line 58: permit tcp any any eq 8443"));
}

#[test]
fn inspect_json_reports_counts() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("zfw-convert"));
    let output = cmd
        .arg("inspect")
        .arg(fixture("fixtures/branch_zbf.txt"))
        .arg("--format")
        .arg("json")
        .output()
        .expect("run inspect");
    assert!(output.status.success());

    let report: Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(report["sections"]["object_groups"], 7);
    assert_eq!(report["sections"]["acls"], 4);
    assert_eq!(report["unparsed"][0]["line"], 58);
}

#[test]
fn inspect_missing_file_fails() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("zfw-convert"));
    cmd.arg("inspect")
        .arg(fixture("fixtures/does-not-exist.txt"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse"));
}
