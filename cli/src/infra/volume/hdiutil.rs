//! `hdiutil` encrypted sparse images (macOS).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use secrecy::{ExposeSecret, SecretString};

use crate::application::ports::{CommandRunner, VolumeBoundary};
use crate::domain::MountLayout;
use crate::domain::volume::VOLUME_LABEL;
use crate::infra::command_runner::{
    HEAVY_CMD_TIMEOUT, TokioCommandRunner, VOLUME_CREATE_TIMEOUT, ensure_success,
};
use crate::infra::volume::{ensure_parent, first_mount_point};

const HDIUTIL: &str = "hdiutil";

pub struct HdiutilVolumes<R: CommandRunner> {
    layout: MountLayout,
    runner: R,
    create_runner: R,
}

impl<R: CommandRunner> HdiutilVolumes<R> {
    pub fn new(layout: MountLayout, runner: R, create_runner: R) -> Self {
        Self {
            layout,
            runner,
            create_runner,
        }
    }
}

impl HdiutilVolumes<TokioCommandRunner> {
    #[must_use]
    pub fn default_runner() -> Self {
        Self::new(
            MountLayout::for_host(),
            TokioCommandRunner::new(HEAVY_CMD_TIMEOUT),
            TokioCommandRunner::new(VOLUME_CREATE_TIMEOUT),
        )
    }
}

impl<R: CommandRunner> VolumeBoundary for HdiutilVolumes<R> {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn find_mount_point(&self) -> Option<PathBuf> {
        first_mount_point(&self.layout)
    }

    async fn mount(&self, path: &Path, secret: &SecretString) -> Result<PathBuf> {
        let mount_point = self.layout.mount_point_for(path);
        let mp = mount_point.to_string_lossy();
        let image = path.to_string_lossy();
        let output = self
            .runner
            .run_with_stdin(
                HDIUTIL,
                &["attach", "-stdinpass", "-nobrowse", "-mountpoint", &mp, &image],
                secret.expose_secret().as_bytes(),
            )
            .await
            .context("hdiutil attach")?;
        ensure_success("hdiutil attach", &output)?;
        Ok(mount_point)
    }

    async fn unmount(&self, mount_point: &Path) -> Result<()> {
        let mp = mount_point.to_string_lossy();
        let output = self
            .runner
            .run(HDIUTIL, &["detach", &mp])
            .await
            .context("hdiutil detach")?;
        ensure_success("hdiutil detach", &output)
    }

    async fn create(&self, path: &Path, size_gb: u32, secret: &SecretString) -> Result<()> {
        ensure_parent(path)?;
        let size = format!("{size_gb}g");
        let image = path.to_string_lossy();
        let output = self
            .create_runner
            .run_with_stdin(
                HDIUTIL,
                &[
                    "create",
                    "-size",
                    &size,
                    "-type",
                    "SPARSE",
                    "-fs",
                    "APFS",
                    "-volname",
                    VOLUME_LABEL,
                    "-encryption",
                    "AES-256",
                    "-stdinpass",
                    &image,
                ],
                secret.expose_secret().as_bytes(),
            )
            .await
            .context("hdiutil create")?;
        ensure_success("hdiutil create", &output)
    }
}
