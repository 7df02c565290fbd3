//! `RemoteResolver` backed by the `git` CLI.

use std::path::Path;

use crate::application::ports::{CommandRunner, RemoteResolver};
use crate::infra::command_runner::{QUICK_CMD_TIMEOUT, TokioCommandRunner};

pub struct GitRemote<R: CommandRunner> {
    runner: R,
}

impl<R: CommandRunner> GitRemote<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }
}

impl GitRemote<TokioCommandRunner> {
    #[must_use]
    pub fn default_runner() -> Self {
        Self::new(TokioCommandRunner::new(QUICK_CMD_TIMEOUT))
    }
}

impl<R: CommandRunner> RemoteResolver for GitRemote<R> {
    async fn remote_url(&self, workspace: &Path) -> Option<String> {
        let dir = workspace.to_string_lossy();
        let output = self
            .runner
            .run("git", &["-C", &dir, "remote", "get-url", "origin"])
            .await
            .ok()?;
        if !output.status.success() {
            return None;
        }
        let url = String::from_utf8_lossy(&output.stdout).trim().to_string();
        (!url.is_empty()).then_some(url)
    }
}
