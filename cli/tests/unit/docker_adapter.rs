//! Unit tests for `infra::docker::DockerCli` against a scripted runner.

#![allow(clippy::expect_used)]

use std::path::Path;
use std::time::Duration;

use capsule_cli::application::ports::ContainerBoundary;
use capsule_cli::application::services::session_stop::{HaltOutcome, halt_container};
use capsule_cli::domain::{BoundaryError, ContainerConfig, error_code};
use capsule_cli::infra::docker::DockerCli;

use crate::helpers::{err_output, exit_status, ok_output};
use crate::mocks::ScriptedRunner;

const NAME: &str = "capsule-github.com-dev-app";

fn docker(quick: &ScriptedRunner, heavy: &ScriptedRunner) -> DockerCli<ScriptedRunner> {
    DockerCli::new(quick.clone(), heavy.clone())
}

fn args(call: &(String, Vec<String>)) -> Vec<&str> {
    call.1.iter().map(String::as_str).collect()
}

#[tokio::test]
async fn test_exists_filters_on_exact_name() {
    let quick = ScriptedRunner::new(vec![Ok(ok_output(b"3f2a9c\n"))]);
    let heavy = ScriptedRunner::default();

    assert!(ContainerBoundary::exists(&docker(&quick, &heavy), NAME).await);

    let calls = quick.calls();
    let filter = r"name=^capsule-github\.com-dev-app$";
    assert_eq!(calls[0].0, "docker");
    assert_eq!(args(&calls[0]), ["ps", "-a", "-q", "-f", filter]);
}

#[tokio::test]
async fn test_sibling_with_dots_replaced_is_not_halted() {
    // `docker ps` honours the escaped filter and reports nothing for NAME even
    // though `capsule-github-com-dev-app` exists.
    let quick = ScriptedRunner::new(vec![Ok(ok_output(b"\n"))]);
    let heavy = ScriptedRunner::default();
    let docker = docker(&quick, &heavy);

    let outcome = halt_container(&docker, NAME, Duration::from_secs(10))
        .await
        .expect("nothing to halt");

    assert_eq!(outcome, HaltOutcome::Absent);
    assert!(heavy.calls().is_empty(), "no stop or rm for an absent container");
}

#[tokio::test]
async fn test_exists_empty_output_means_absent() {
    let quick = ScriptedRunner::new(vec![Ok(ok_output(b"\n"))]);
    let heavy = ScriptedRunner::default();
    assert!(!ContainerBoundary::exists(&docker(&quick, &heavy), NAME).await);
}

#[tokio::test]
async fn test_exists_tool_failure_means_absent() {
    let quick = ScriptedRunner::new(vec![Ok(err_output(1, b"Cannot connect"))]);
    let heavy = ScriptedRunner::default();
    assert!(!ContainerBoundary::exists(&docker(&quick, &heavy), NAME).await);
}

#[tokio::test]
async fn test_running_parses_inspect_output() {
    let quick = ScriptedRunner::new(vec![
        Ok(ok_output(b"true\n")),
        Ok(ok_output(b"false\n")),
        Ok(err_output(1, b"No such object")),
    ]);
    let heavy = ScriptedRunner::default();
    let docker = docker(&quick, &heavy);

    assert!(docker.running(NAME).await);
    assert!(!docker.running(NAME).await);
    assert!(!docker.running(NAME).await);
}

#[tokio::test]
async fn test_stop_passes_grace_seconds() {
    let quick = ScriptedRunner::default();
    let heavy = ScriptedRunner::new(vec![Ok(ok_output(b""))]);

    docker(&quick, &heavy)
        .stop(NAME, Duration::from_secs(15))
        .await
        .expect("stop");

    assert_eq!(args(&heavy.calls()[0]), ["stop", "-t", "15", NAME]);
}

#[tokio::test]
async fn test_stop_failure_carries_stderr() {
    let quick = ScriptedRunner::default();
    let heavy = ScriptedRunner::new(vec![Ok(err_output(1, b"container is paused\n"))]);

    let err = docker(&quick, &heavy)
        .stop(NAME, Duration::from_secs(10))
        .await
        .expect_err("stop fails");

    assert_eq!(error_code(&err), "BOUNDARY_FAILED");
    assert!(format!("{err:#}").contains("container is paused"), "got: {err:#}");
}

#[tokio::test]
async fn test_stop_timeout_is_typed() {
    let quick = ScriptedRunner::default();
    let heavy = ScriptedRunner::new(vec![Err(BoundaryError::Timeout {
        step: "docker stop".to_string(),
        after: Duration::from_secs(70),
    }
    .into())]);

    let err = docker(&quick, &heavy)
        .stop(NAME, Duration::from_secs(10))
        .await
        .expect_err("timeout");
    assert_eq!(error_code(&err), "TIMEOUT");
}

#[tokio::test]
async fn test_daemon_unavailable_maps_to_typed_error() {
    let quick = ScriptedRunner::new(vec![Ok(err_output(
        1,
        b"Cannot connect to the Docker daemon at unix:///var/run/docker.sock",
    ))]);
    let heavy = ScriptedRunner::default();

    let err = docker(&quick, &heavy)
        .daemon_available()
        .await
        .expect_err("daemon down");
    assert_eq!(error_code(&err), "DAEMON_UNAVAILABLE");
}

#[tokio::test]
async fn test_run_uses_heavy_runner_with_bind_mounts() {
    let quick = ScriptedRunner::default();
    let heavy = ScriptedRunner::new(vec![Ok(ok_output(b"abc123\n"))]);
    let config = ContainerConfig::new(
        "capsule:latest",
        NAME,
        Path::new("/tmp/capsule-mount-capsule-env"),
        Path::new("/home/dev/src/app"),
    )
    .expect("valid config");

    docker(&quick, &heavy).run(&config).await.expect("run");

    assert!(quick.calls().is_empty());
    let calls = heavy.calls();
    let run = args(&calls[0]);
    assert_eq!(run[..4], ["run", "-d", "--name", NAME]);
    assert!(run.contains(&"type=bind,source=/tmp/capsule-mount-capsule-env,target=/capsule-env"));
    assert!(run.contains(&"type=bind,source=/home/dev/src/app,target=/workspace"));
}

#[tokio::test]
async fn test_remove_forces() {
    let quick = ScriptedRunner::default();
    let heavy = ScriptedRunner::new(vec![Ok(ok_output(b""))]);

    docker(&quick, &heavy).remove(NAME).await.expect("rm");
    assert_eq!(args(&heavy.calls()[0]), ["rm", "-f", NAME]);
}

#[tokio::test]
async fn test_exec_shell_exit_code_is_not_an_error() {
    let quick = ScriptedRunner::default();
    let heavy = ScriptedRunner::new(vec![Ok(std::process::Output {
        status: exit_status(130),
        stdout: Vec::new(),
        stderr: Vec::new(),
    })]);

    docker(&quick, &heavy)
        .exec_interactive(NAME, "/bin/bash")
        .await
        .expect("user exit code is fine");
    assert_eq!(args(&heavy.calls()[0]), ["exec", "-it", NAME, "/bin/bash"]);
}

#[tokio::test]
async fn test_exec_docker_failure_is_an_error() {
    let quick = ScriptedRunner::default();
    let heavy = ScriptedRunner::new(vec![Ok(std::process::Output {
        status: exit_status(126),
        stdout: Vec::new(),
        stderr: Vec::new(),
    })]);

    let err = docker(&quick, &heavy)
        .exec_interactive(NAME, "/bin/zsh")
        .await
        .expect_err("shell not executable");
    assert_eq!(error_code(&err), "BOUNDARY_FAILED");
}
