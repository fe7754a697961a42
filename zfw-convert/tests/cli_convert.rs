use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::tempdir;

fn fixture(path: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join(path)
}

fn read_json(path: &std::path::Path) -> Value {
    let raw = fs::read_to_string(path).expect("read output");
    serde_json::from_str(&raw).expect("output json")
}

#[test]
fn convert_writes_document_and_prints_summary() {
    let dir = tempdir().expect("tempdir");
    let out = dir.path().join("branch.json");

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("zfw-convert"));
    cmd.arg("convert")
        .arg(fixture("fixtures/branch_zbf.txt"))
        .arg("-o")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration validation passed!"))
        .stdout(predicate::str::contains("Zones: 3"))
        .stdout(predicate::str::contains("Filter Policies: 3"))
        .stdout(predicate::str::contains("Zone Forwardings: 3"))
        .stdout(predicate::str::contains("IP Identities: 6"))
        .stdout(predicate::str::contains("Port Identities: 6"))
        .stdout(predicate::str::contains("unparsed_line line=58"));

    let doc = read_json(&out);
    assert_eq!(doc["configuration"].as_array().map(Vec::len), Some(2));
    assert_eq!(doc["export_type"], "group");
    assert!(doc["config_encryption_id"].is_null());
}

#[test]
fn convert_defaults_output_next_to_input() {
    let dir = tempdir().expect("tempdir");
    let input = dir.path().join("lab.txt");
    fs::copy(fixture("fixtures/no_policy.txt"), &input).expect("copy fixture");

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("zfw-convert"));
    cmd.arg("convert").arg(&input).assert().success();

    let doc = read_json(&dir.path().join("lab_cradlepoint.json"));
    let policies = doc["configuration"][0]["security"]["zfw"]["filter_policies"]
        .as_object()
        .expect("policies");
    assert_eq!(policies.len(), 2);
}

#[test]
fn convert_adds_internet_zone_with_custom_name() {
    let dir = tempdir().expect("tempdir");
    let out = dir.path().join("out.json");

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("zfw-convert"));
    cmd.arg("convert")
        .arg(fixture("fixtures/branch_zbf.txt"))
        .arg("--add-internet-zone")
        .arg("--internet-zone-name")
        .arg("CARRIER")
        .arg("--output")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Zones: 4"))
        .stdout(predicate::str::contains("Zone Forwardings: 6"));

    let doc = read_json(&out);
    let zones = doc["configuration"][0]["security"]["zfw"]["zones"]
        .as_object()
        .expect("zones");
    assert!(zones.values().any(|z| z["name"] == "CARRIER"));
}

#[test]
fn deterministic_ids_repeat_across_runs() {
    let dir = tempdir().expect("tempdir");
    let first = dir.path().join("a.json");
    let second = dir.path().join("b.json");

    for out in [&first, &second] {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("zfw-convert"));
        cmd.arg("convert")
            .arg(fixture("fixtures/mixed_services.txt"))
            .arg("--deterministic-ids")
            .arg("-o")
            .arg(out)
            .assert()
            .success();
    }

    assert_eq!(
        fs::read_to_string(&first).expect("read"),
        fs::read_to_string(&second).expect("read")
    );
}

#[test]
fn convert_refuses_to_overwrite_input() {
    let dir = tempdir().expect("tempdir");
    let input = dir.path().join("router.txt");
    fs::copy(fixture("fixtures/no_policy.txt"), &input).expect("copy fixture");

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("zfw-convert"));
    cmd.arg("convert")
        .arg(&input)
        .arg("-o")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("refusing to overwrite source file"));
}

#[test]
fn strict_mode_fails_on_validation_issues() {
    let dir = tempdir().expect("tempdir");
    let input = dir.path().join("empty.txt");
    fs::write(&input, "hostname empty\n").expect("write");

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("zfw-convert"));
    cmd.arg("convert")
        .arg(&input)
        .arg("--strict")
        .assert()
        .failure()
        .stdout(predicate::str::contains("No zones found"))
        .stderr(predicate::str::contains("convert failed in strict mode"));
}

#[test]
fn legacy_profile_file_is_applied() {
    let dir = tempdir().expect("tempdir");
    let profile = dir.path().join("legacy.toml");
    fs::write(&profile, "legacy_tcp_only = true\nfirmware_version = \"7.22.0\"\n").expect("write");
    let out = dir.path().join("out.json");

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("zfw-convert"));
    cmd.arg("convert")
        .arg(fixture("fixtures/no_policy.txt"))
        .arg("--profile")
        .arg(&profile)
        .arg("-o")
        .arg(&out)
        .assert()
        .success();

    let doc = read_json(&out);
    assert_eq!(doc["firmware_version"], "7.22.0");
    let policy = doc["configuration"][0]["security"]["zfw"]["filter_policies"]
        .as_object()
        .and_then(|p| p.values().next())
        .expect("policy");
    assert_eq!(policy["rules"]["0"]["protocols"]["0"]["identity"], 6);
}

#[test]
fn missing_input_fails() {
    let dir = tempdir().expect("tempdir");
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("zfw-convert"));
    cmd.arg("convert")
        .arg(dir.path().join("nope.txt"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to convert"));
}
