//! Unit tests for `application::services::detect`.

#![allow(clippy::expect_used)]

use std::path::{Path, PathBuf};

use capsule_cli::application::services::detect::{DetectTarget, detect};
use capsule_cli::domain::{LinkStatus, SessionPhase};

use crate::helpers::{MOUNT_POINT, VOLUME_PATH, WORKSPACE};
use crate::mocks::{FakeHost, HostState};

fn target() -> DetectTarget<'static> {
    DetectTarget {
        volume_path: Path::new(VOLUME_PATH),
        container_name: "capsule-github.com-dev-app",
        workspace: Path::new(WORKSPACE),
    }
}

#[tokio::test]
async fn test_detect_fresh_machine_reports_nothing() {
    let host = FakeHost::new(HostState {
        volume_exists: false,
        ..HostState::default()
    });
    let state = detect(&host, &host, &host, target()).await;

    assert!(!state.volume_exists);
    assert!(!state.volume_mounted);
    assert!(!state.container_exists);
    assert!(!state.container_running);
    assert!(!state.symlink_exists);
    assert!(!state.symlink_broken);
    assert_eq!(state.volume_path, PathBuf::from(VOLUME_PATH));
    assert_eq!(state.phase(), SessionPhase::Locked);
}

#[tokio::test]
async fn test_detect_ready_environment() {
    let host = FakeHost::ready();
    let state = detect(&host, &host, &host, target()).await;

    assert!(state.volume_mounted);
    assert_eq!(state.mount_point(), Some(Path::new(MOUNT_POINT)));
    assert!(state.container_running);
    assert!(state.symlink_healthy());
    assert_eq!(state.phase(), SessionPhase::Ready);
}

#[tokio::test]
async fn test_detect_mount_without_volume_file_is_not_mounted() {
    let host = FakeHost::new(HostState {
        volume_exists: false,
        mount_point: Some(PathBuf::from(MOUNT_POINT)),
        ..HostState::default()
    });
    let state = detect(&host, &host, &host, target()).await;

    assert!(!state.volume_mounted);
    assert_eq!(state.mount_point(), None);
}

#[tokio::test]
async fn test_detect_skips_running_query_for_absent_container() {
    let host = FakeHost::locked();
    let _ = detect(&host, &host, &host, target()).await;

    let calls = host.all_calls();
    assert!(calls.contains(&"query:container.exists".to_string()));
    assert!(
        !calls.contains(&"query:container.running".to_string()),
        "running queried for absent container: {calls:?}"
    );
}

#[tokio::test]
async fn test_detect_stopped_container_is_mounted_phase() {
    let host = FakeHost::new(HostState {
        mount_point: Some(PathBuf::from(MOUNT_POINT)),
        container_exists: true,
        container_running: false,
        ..HostState::default()
    });
    let state = detect(&host, &host, &host, target()).await;

    assert!(state.container_exists);
    assert!(!state.container_running);
    assert_eq!(state.phase(), SessionPhase::Mounted);
}

#[tokio::test]
async fn test_detect_broken_link_after_external_unmount() {
    let host = FakeHost::new(HostState {
        link: LinkStatus {
            exists: true,
            broken: true,
        },
        ..HostState::default()
    });
    let state = detect(&host, &host, &host, target()).await;

    assert!(state.symlink_exists);
    assert!(state.symlink_broken);
    assert!(!state.symlink_healthy());
}

#[tokio::test]
async fn test_detect_performs_no_mutations() {
    let host = FakeHost::ready();
    let first = detect(&host, &host, &host, target()).await;
    let second = detect(&host, &host, &host, target()).await;

    assert_eq!(first, second);
    assert!(host.actions().is_empty(), "mutations: {:?}", host.actions());
}
