//! Unit tests for `lock_volume`.

#![allow(clippy::expect_used)]

use std::time::Duration;

use capsule_cli::application::services::session_stop::HaltOutcome;
use capsule_cli::application::services::volume_lock::{LockOptions, LockOutcome, lock_volume};
use capsule_cli::domain::error_code;

use crate::helpers::{MOUNT_POINT, session};
use crate::mocks::{FakeHost, HostState, RecordingReporter};

fn opts<'a>(
    reporter: &'a RecordingReporter,
    session: &'a capsule_cli::domain::Session,
) -> LockOptions<'a, RecordingReporter> {
    LockOptions {
        reporter,
        session,
        release_delay: Duration::ZERO,
    }
}

#[tokio::test]
async fn test_lock_stops_container_before_unmount() {
    let host = FakeHost::ready();
    let reporter = RecordingReporter::default();
    let session = session();

    let outcome = lock_volume(&host, &host, &host, opts(&reporter, &session))
        .await
        .expect("lock");

    assert!(matches!(
        outcome,
        LockOutcome::Locked {
            halt: HaltOutcome::Stopped
        }
    ));
    let name = &session.container_name;
    assert_eq!(
        host.actions(),
        [
            format!("container.stop {name} 10"),
            format!("container.remove {name}"),
            format!("volume.unmount {MOUNT_POINT}"),
        ]
    );
    let state = host.state();
    assert_eq!(state.mount_point, None);
    assert!(!state.container_exists);
}

#[tokio::test]
async fn test_lock_never_unmounts_after_failed_stop() {
    let host = FakeHost::ready();
    host.update(|s| {
        s.fail_stop = true;
        s.fail_kill = true;
    });
    let reporter = RecordingReporter::default();
    let session = session();

    let err = lock_volume(&host, &host, &host, opts(&reporter, &session))
        .await
        .expect_err("stop failure aborts the lock");

    assert!(format!("{err:#}").contains("failed to stop"), "got: {err:#}");
    assert_eq!(error_code(&err), "STOP_FAILED");
    assert!(
        !host.actions().iter().any(|a| a.starts_with("volume.unmount")),
        "unmounted under a live container: {:?}",
        host.actions()
    );
    assert!(host.state().mount_point.is_some());
}

#[tokio::test]
async fn test_lock_already_locked_is_noop() {
    let host = FakeHost::locked();
    let reporter = RecordingReporter::default();
    let session = session();

    let outcome = lock_volume(&host, &host, &host, opts(&reporter, &session))
        .await
        .expect("lock");

    assert!(matches!(
        outcome,
        LockOutcome::AlreadyLocked {
            halt: HaltOutcome::Absent
        }
    ));
    assert!(host.actions().is_empty());
    assert!(reporter.events().contains(&"ok:volume already locked".to_string()));
}

#[tokio::test]
async fn test_lock_removes_stale_container_when_unmounted() {
    let host = FakeHost::new(HostState {
        container_exists: true,
        ..HostState::default()
    });
    let reporter = RecordingReporter::default();
    let session = session();

    let outcome = lock_volume(&host, &host, &host, opts(&reporter, &session))
        .await
        .expect("lock");

    assert!(matches!(
        outcome,
        LockOutcome::AlreadyLocked {
            halt: HaltOutcome::RemovedStale
        }
    ));
    assert_eq!(
        host.actions(),
        [format!("container.remove {}", session.container_name)]
    );
}

#[tokio::test]
async fn test_lock_unmount_failure_names_step() {
    let host = FakeHost::ready();
    host.update(|s| s.fail_unmount = true);
    let reporter = RecordingReporter::default();
    let session = session();

    let err = lock_volume(&host, &host, &host, opts(&reporter, &session))
        .await
        .expect_err("unmount fails");

    let msg = format!("{err:#}");
    assert!(msg.starts_with("unmount volume"), "got: {msg}");
    assert!(msg.contains("target is busy"), "got: {msg}");
}

#[tokio::test]
async fn test_lock_leaves_docs_link_broken() {
    let host = FakeHost::ready();
    let reporter = RecordingReporter::default();
    let session = session();

    lock_volume(&host, &host, &host, opts(&reporter, &session))
        .await
        .expect("lock");

    let link = host.state().link;
    assert!(link.exists);
    assert!(link.broken);
}
