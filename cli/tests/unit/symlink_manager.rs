//! Unit tests for `infra::symlink::FsSymlinkManager` on a temporary directory.

#![cfg(unix)]
#![allow(clippy::expect_used)]

use std::fs;

use capsule_cli::application::ports::SymlinkManager;
use capsule_cli::domain::{SessionError, normalize};
use capsule_cli::infra::symlink::{FsSymlinkManager, docs_link_path};
use tempfile::TempDir;

struct Fixture {
    _root: TempDir,
    workspace: std::path::PathBuf,
    mount: std::path::PathBuf,
}

fn fixture() -> Fixture {
    let root = tempfile::tempdir().expect("tempdir");
    let workspace = root.path().join("workspace");
    let mount = root.path().join("capsule-mount-capsule-env");
    fs::create_dir_all(&workspace).expect("workspace");
    fs::create_dir_all(&mount).expect("mount");
    Fixture {
        _root: root,
        workspace,
        mount,
    }
}

#[test]
fn test_link_creates_target_and_symlink() {
    let fx = fixture();
    let project = normalize("git@github.com:dev/app.git");

    let target = FsSymlinkManager
        .link(&fx.workspace, &fx.mount, &project)
        .expect("link");

    assert_eq!(target, fx.mount.join("repos").join("github.com-dev-app"));
    assert!(target.is_dir());
    let link = docs_link_path(&fx.workspace);
    assert_eq!(fs::read_link(&link).expect("read_link"), target);

    let status = FsSymlinkManager.inspect(&fx.workspace);
    assert!(status.exists);
    assert!(!status.broken);
}

#[test]
fn test_link_replaces_existing_symlink() {
    let fx = fixture();
    let old_target = fx.workspace.join("elsewhere");
    fs::create_dir_all(&old_target).expect("old target");
    std::os::unix::fs::symlink(&old_target, docs_link_path(&fx.workspace)).expect("old link");

    let project = normalize("https://github.com/dev/app.git");
    let target = FsSymlinkManager
        .link(&fx.workspace, &fx.mount, &project)
        .expect("relink");

    assert_eq!(
        fs::read_link(docs_link_path(&fx.workspace)).expect("read_link"),
        target
    );
    assert!(old_target.is_dir(), "old target must not be touched");
}

#[test]
fn test_link_is_repeatable() {
    let fx = fixture();
    let project = normalize("github.com/dev/app");
    let first = FsSymlinkManager
        .link(&fx.workspace, &fx.mount, &project)
        .expect("first");
    let second = FsSymlinkManager
        .link(&fx.workspace, &fx.mount, &project)
        .expect("second");
    assert_eq!(first, second);
}

#[test]
fn test_link_clears_stale_temp_link() {
    let fx = fixture();
    std::os::unix::fs::symlink("/nonexistent", fx.workspace.join("_docs.tmp")).expect("stale");

    FsSymlinkManager
        .link(&fx.workspace, &fx.mount, &normalize("app"))
        .expect("link");

    assert!(fs::symlink_metadata(fx.workspace.join("_docs.tmp")).is_err());
    assert!(FsSymlinkManager.inspect(&fx.workspace).exists);
}

#[test]
fn test_link_refuses_plain_directory() {
    let fx = fixture();
    let docs = docs_link_path(&fx.workspace);
    fs::create_dir_all(&docs).expect("plain dir");
    fs::write(docs.join("notes.md"), "keep me").expect("file");

    let err = FsSymlinkManager
        .link(&fx.workspace, &fx.mount, &normalize("app"))
        .expect_err("occupied");

    assert!(matches!(
        err.downcast_ref::<SessionError>(),
        Some(SessionError::LinkPathOccupied(_))
    ));
    assert_eq!(
        fs::read_to_string(docs.join("notes.md")).expect("still there"),
        "keep me"
    );
}

#[test]
fn test_link_rejects_relative_paths() {
    let fx = fixture();
    let err = FsSymlinkManager
        .link(std::path::Path::new("relative/ws"), &fx.mount, &normalize("app"))
        .expect_err("relative workspace");
    assert!(err.to_string().contains("absolute"), "got: {err}");
}

#[test]
fn test_inspect_missing_link() {
    let fx = fixture();
    let status = FsSymlinkManager.inspect(&fx.workspace);
    assert!(!status.exists);
    assert!(!status.broken);
}

#[test]
fn test_inspect_detects_broken_link() {
    let fx = fixture();
    FsSymlinkManager
        .link(&fx.workspace, &fx.mount, &normalize("app"))
        .expect("link");
    // Simulate the volume going away underneath the link.
    fs::remove_dir_all(fx.mount.join("repos")).expect("remove target");

    let status = FsSymlinkManager.inspect(&fx.workspace);
    assert!(status.exists);
    assert!(status.broken);
}

#[test]
fn test_inspect_plain_directory_is_not_a_link() {
    let fx = fixture();
    fs::create_dir_all(docs_link_path(&fx.workspace)).expect("plain dir");

    let status = FsSymlinkManager.inspect(&fx.workspace);
    assert!(!status.exists);
}
