//! Integration tests for the read-only and fail-fast paths of session commands.
//!
//! Each test runs against a temp workspace, a temp config and a volume path
//! that does not exist, so no password is ever requested and nothing is
//! mounted. A container runtime may or may not be installed.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::collections::HashMap;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        let dir = TempDir::new().expect("temp dir");
        std::fs::create_dir_all(dir.path().join("workspace")).expect("workspace");
        Self { dir }
    }

    fn volume(&self) -> std::path::PathBuf {
        self.dir.path().join("capsule-env.img")
    }

    fn capsule(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("capsule"));
        cmd.env("NO_COLOR", "1")
            .env("CAPSULE_CONFIG", self.dir.path().join("config.yaml"))
            .env_remove("CAPSULE_VOLUME")
            .arg("--workspace")
            .arg(self.dir.path().join("workspace"))
            .arg("--volume")
            .arg(self.volume());
        cmd
    }
}

fn parse_pairs(stdout: &[u8]) -> HashMap<String, String> {
    String::from_utf8_lossy(stdout)
        .lines()
        .filter_map(|l| l.split_once('='))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_status_porcelain_reports_missing_volume() {
    let sb = Sandbox::new();
    let assert = sb.capsule().args(["status", "--porcelain"]).assert().success();
    let pairs = parse_pairs(&assert.get_output().stdout);

    assert_eq!(pairs["VOLUME_EXISTS"], "false");
    assert_eq!(pairs["MOUNTED"], "false");
    assert_eq!(pairs["MOUNT_POINT"], "");
    assert_eq!(pairs["SYMLINK_EXISTS"], "false");
    assert_eq!(pairs["PHASE"], "locked");
    assert_eq!(pairs["VOLUME_PATH"], sb.volume().display().to_string());
    assert!(pairs["CONTAINER"].starts_with("capsule-"), "got: {pairs:?}");
}

#[cfg(unix)]
#[test]
fn test_status_porcelain_sees_broken_docs_link() {
    let sb = Sandbox::new();
    std::os::unix::fs::symlink(
        sb.dir.path().join("gone/repos/x"),
        sb.dir.path().join("workspace/_docs"),
    )
    .unwrap();

    let assert = sb.capsule().args(["status", "--porcelain"]).assert().success();
    let pairs = parse_pairs(&assert.get_output().stdout);

    assert_eq!(pairs["SYMLINK_EXISTS"], "true");
    assert_eq!(pairs["SYMLINK_BROKEN"], "true");
}

#[test]
fn test_status_json_has_state_fields() {
    let sb = Sandbox::new();
    let assert = sb.capsule().args(["status", "--json"]).assert().success();
    let json: serde_json::Value =
        serde_json::from_slice(&assert.get_output().stdout).expect("valid JSON");

    assert_eq!(json["volume_exists"], false);
    assert_eq!(json["volume_mounted"], false);
    assert_eq!(json["phase"], "locked");
    assert_eq!(json["volume_source"], "explicit");
}

#[test]
fn test_status_human_suggests_init() {
    let sb = Sandbox::new();
    sb.capsule()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("capsule init"));
}

#[test]
fn test_unlock_missing_volume_fails_without_prompt() {
    let sb = Sandbox::new();
    let assert = sb.capsule().args(["unlock", "--json"]).assert().code(1);
    let json: serde_json::Value =
        serde_json::from_slice(&assert.get_output().stdout).expect("JSON error object");
    assert_eq!(json["code"], "VOLUME_MISSING");
}

#[test]
fn test_init_out_of_range_size_fails_before_prompt() {
    let sb = Sandbox::new();
    sb.capsule()
        .args(["init", "--size", "0"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("outside the allowed range"));
    assert!(!sb.volume().exists());
}

#[test]
fn test_init_refuses_existing_volume() {
    let sb = Sandbox::new();
    std::fs::write(sb.volume(), b"not really a volume").unwrap();

    let assert = sb.capsule().args(["init", "--json"]).assert().code(1);
    let json: serde_json::Value =
        serde_json::from_slice(&assert.get_output().stdout).expect("JSON error object");
    assert_eq!(json["code"], "VOLUME_EXISTS");
    assert_eq!(
        std::fs::read(sb.volume()).unwrap(),
        b"not really a volume".to_vec()
    );
}
