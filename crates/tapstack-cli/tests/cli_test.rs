//! Integration tests for the tapstack CLI

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

/// Command with a clean environment pointed at `project`
fn tapstack(project: &Path) -> Command {
    let mut cmd = Command::cargo_bin("tapstack").unwrap();
    cmd.env_clear()
        .arg("--project-dir")
        .arg(project)
        .arg("--no-user-context");
    cmd
}

fn flat_outputs(region: &str) -> String {
    format!(
        r#"{{
  "VpcId": "vpc-0a1b2c",
  "VpcCidr": "10.0.0.0/16",
  "PrivateSubnet1": "subnet-111",
  "PrivateSubnet2": "subnet-222",
  "PublicSubnet1": "subnet-333",
  "PublicSubnet2": "subnet-444",
  "Ec2Instance1Id": "i-0aaa",
  "Ec2Instance2Id": "i-0bbb",
  "RdsInstanceId": "webapp-prod-mysql-db-2",
  "KmsKeyId": "1234abcd",
  "AlertTopicArn": "arn:aws:sns:{region}:123456789012:alerts",
  "CloudTrailEnabled": "false",
  "Region": "{region}"
}}"#
    )
}

#[test]
fn test_help_command() {
    let mut cmd = Command::cargo_bin("tapstack").unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("resolve"))
        .stdout(predicate::str::contains("verify"));
}

#[test]
fn test_resolve_defaults() {
    let dir = tempdir().unwrap();
    tapstack(dir.path())
        .arg("resolve")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""projectName": "webapp""#))
        .stdout(predicate::str::contains(r#""region": "eu-north-1""#))
        .stdout(predicate::str::contains(r#""stackId": "TapStack""#))
        .stdout(predicate::str::contains("arn:aws:s3:::webapp-prod-*/*"));
}

#[test]
fn test_env_beats_context_override() {
    let dir = tempdir().unwrap();
    tapstack(dir.path())
        .env("PROJECT_NAME", "acme")
        .args(["--context", "projectName=other", "--context", "environment=qa"])
        .args(["name", "vpc"])
        .assert()
        .success()
        .stdout("acme-qa-vpc\n");
}

#[test]
fn test_name_uses_defaults() {
    let dir = tempdir().unwrap();
    tapstack(dir.path())
        .args(["name", "vpc"])
        .assert()
        .success()
        .stdout("webapp-prod-vpc\n");
}

#[test]
fn test_region_file_used_when_nothing_else_set() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("lib")).unwrap();
    fs::write(dir.path().join("lib/AWS_REGION"), "ap-southeast-2\n").unwrap();

    tapstack(dir.path())
        .args(["resolve", "--format", "yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("region: ap-southeast-2"))
        .stdout(predicate::str::contains("source: file"));
}

#[test]
fn test_cdk_json_context_is_read() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("cdk.json"),
        r#"{"app": "x", "context": {"environment": "staging", "environmentSuffix": "pr7"}}"#,
    )
    .unwrap();

    tapstack(dir.path())
        .arg("resolve")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""stackId": "TapStackpr7""#))
        .stdout(predicate::str::contains(r#""environment": "staging""#));
}

#[test]
fn test_bad_port_fails() {
    let dir = tempdir().unwrap();
    tapstack(dir.path())
        .env("EXTRA_EGRESS_PORTS", "8080,abc")
        .arg("resolve")
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("abc"));
}

#[test]
fn test_malformed_override_fails() {
    let dir = tempdir().unwrap();
    tapstack(dir.path())
        .args(["--context", "no-equals-sign", "resolve"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no-equals-sign"));
}

#[test]
fn test_missing_context_file_fails() {
    let dir = tempdir().unwrap();
    tapstack(dir.path())
        .arg("--context-file")
        .arg(dir.path().join("nope.yaml"))
        .arg("resolve")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Context file not found"));
}

#[test]
fn test_synth_writes_plan() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("out/plan.json");

    tapstack(dir.path())
        .args(["--context", "enableCloudTrail=true", "synth", "--out"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote"));

    let plan = fs::read_to_string(&out).unwrap();
    assert!(plan.contains("webapp-prod-cloudtrail-logs-2"));
    assert!(plan.contains("CloudTrailBucketName"));
}

#[test]
fn test_outputs_absent_skips() {
    let dir = tempdir().unwrap();
    tapstack(dir.path())
        .arg("outputs")
        .assert()
        .success()
        .stdout(predicate::str::contains("skipping"));
}

#[test]
fn test_verify_absent_outputs_succeeds() {
    let dir = tempdir().unwrap();
    tapstack(dir.path())
        .arg("verify")
        .assert()
        .success()
        .stdout(predicate::str::contains("skipping verification"));
}

#[test]
fn test_verify_passes() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("cfn-outputs")).unwrap();
    fs::write(dir.path().join("cfn-outputs/flat-outputs.json"), flat_outputs("eu-north-1")).unwrap();

    tapstack(dir.path())
        .arg("verify")
        .assert()
        .success()
        .stdout(predicate::str::contains("9 passed, 0 failed, 0 skipped"));
}

#[test]
fn test_verify_region_mismatch_fails() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("outputs.json");
    fs::write(&file, flat_outputs("us-east-1")).unwrap();

    tapstack(dir.path())
        .arg("verify")
        .arg("--file")
        .arg(&file)
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("FAIL  region"))
        .stderr(predicate::str::contains("1 check(s) failed"));
}
