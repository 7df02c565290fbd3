//! Unit tests for volume creation and unlock.

#![allow(clippy::expect_used)]

use std::path::{Path, PathBuf};

use capsule_cli::application::services::volume_lock::{
    UnlockOutcome, create_volume, unlock_volume,
};
use capsule_cli::domain::error_code;

use crate::helpers::{MOUNT_POINT, VOLUME_PATH, session};
use crate::mocks::{FakeHost, HostState, RecordingReporter, RecordingSecrets};

fn no_volume() -> FakeHost {
    FakeHost::new(HostState {
        volume_exists: false,
        ..HostState::default()
    })
}

// ── init ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_volume_asks_for_confirmed_secret() {
    let host = no_volume();
    let secrets = RecordingSecrets::default();
    let reporter = RecordingReporter::default();

    let path = create_volume(&host, &secrets, &reporter, Path::new(VOLUME_PATH), 20)
        .await
        .expect("create");

    assert_eq!(path, PathBuf::from(VOLUME_PATH));
    assert_eq!(host.actions(), ["volume.create 20"]);
    let requests = secrets.requests.lock().expect("lock").clone();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].1, "creation must confirm the password");
}

#[tokio::test]
async fn test_create_volume_refuses_existing() {
    let host = FakeHost::locked();
    let secrets = RecordingSecrets::default();
    let reporter = RecordingReporter::default();

    let err = create_volume(&host, &secrets, &reporter, Path::new(VOLUME_PATH), 20)
        .await
        .expect_err("already exists");

    assert_eq!(error_code(&err), "VOLUME_EXISTS");
    assert_eq!(secrets.count(), 0);
    assert!(host.actions().is_empty());
}

#[tokio::test]
async fn test_create_volume_rejects_size_before_prompt() {
    let host = no_volume();
    let secrets = RecordingSecrets::default();
    let reporter = RecordingReporter::default();

    for size in [0, 101] {
        let err = create_volume(&host, &secrets, &reporter, Path::new(VOLUME_PATH), size)
            .await
            .expect_err("out of range");
        assert_eq!(error_code(&err), "INVALID_INPUT");
    }
    assert_eq!(secrets.count(), 0);
    assert!(host.actions().is_empty());
}

// ── unlock ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_unlock_mounts_locked_volume() {
    let host = FakeHost::locked();
    let secrets = RecordingSecrets::default();
    let reporter = RecordingReporter::default();

    let outcome = unlock_volume(&host, &host, &host, &secrets, &reporter, &session())
        .await
        .expect("unlock");

    assert!(matches!(outcome, UnlockOutcome::Unlocked { .. }));
    assert_eq!(outcome.state().mount_point(), Some(Path::new(MOUNT_POINT)));
    assert_eq!(host.actions(), ["volume.mount"]);
    let requests = secrets.requests.lock().expect("lock").clone();
    assert_eq!(requests, [("Volume password".to_string(), false)]);
}

#[tokio::test]
async fn test_unlock_already_mounted_skips_prompt() {
    let host = FakeHost::new(HostState {
        mount_point: Some(PathBuf::from(MOUNT_POINT)),
        ..HostState::default()
    });
    let secrets = RecordingSecrets::default();
    let reporter = RecordingReporter::default();

    let outcome = unlock_volume(&host, &host, &host, &secrets, &reporter, &session())
        .await
        .expect("unlock");

    assert!(matches!(outcome, UnlockOutcome::AlreadyUnlocked { .. }));
    assert_eq!(secrets.count(), 0);
    assert!(host.actions().is_empty());
}

#[tokio::test]
async fn test_unlock_missing_volume_points_at_init() {
    let host = no_volume();
    let secrets = RecordingSecrets::default();
    let reporter = RecordingReporter::default();

    let err = unlock_volume(&host, &host, &host, &secrets, &reporter, &session())
        .await
        .expect_err("no volume");

    assert_eq!(error_code(&err), "VOLUME_MISSING");
    assert!(err.to_string().contains("capsule init"), "got: {err}");
}

#[tokio::test]
async fn test_unlock_wrong_password_surfaces_tool_error() {
    let host = FakeHost::locked();
    host.update(|s| s.fail_mount = true);
    let secrets = RecordingSecrets::default();
    let reporter = RecordingReporter::default();

    let err = unlock_volume(&host, &host, &host, &secrets, &reporter, &session())
        .await
        .expect_err("mount fails");

    let msg = format!("{err:#}");
    assert!(msg.starts_with("mount volume"), "got: {msg}");
    assert!(msg.contains("Authentication error"), "got: {msg}");
}

#[tokio::test]
async fn test_unlock_leaves_container_alone() {
    let host = FakeHost::locked();
    let secrets = RecordingSecrets::default();
    let reporter = RecordingReporter::default();

    unlock_volume(&host, &host, &host, &secrets, &reporter, &session())
        .await
        .expect("unlock");

    assert!(!host.state().container_exists);
    assert!(!host.actions().iter().any(|a| a.starts_with("container.")));
}
