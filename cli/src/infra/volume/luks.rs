//! LUKS-encrypted image files (Linux).
//!
//! The image is opened as `/dev/mapper/capsule-<label>` and mounted at the
//! layout's mount point. Requires `cryptsetup` and mount privileges.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use secrecy::{ExposeSecret, SecretString};

use crate::application::ports::{CommandRunner, VolumeBoundary};
use crate::domain::{MountLayout, PreconditionError};
use crate::domain::volume::VOLUME_LABEL;
use crate::infra::command_runner::{
    HEAVY_CMD_TIMEOUT, TokioCommandRunner, VOLUME_CREATE_TIMEOUT, ensure_success,
};
use crate::infra::volume::{ensure_parent, first_mount_point};

const CRYPTSETUP: &str = "cryptsetup";
const MAPPER_PREFIX: &str = "capsule-";

pub struct LuksVolumes<R: CommandRunner> {
    layout: MountLayout,
    runner: R,
    create_runner: R,
}

impl<R: CommandRunner> LuksVolumes<R> {
    pub fn new(layout: MountLayout, runner: R, create_runner: R) -> Self {
        Self {
            layout,
            runner,
            create_runner,
        }
    }

    /// Device-mapper name for the volume mounted at `mount_point`.
    fn mapper_name(&self, mount_point: &Path) -> String {
        let dir = mount_point
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let label = dir.strip_prefix(&self.layout.prefix).unwrap_or(&dir);
        format!("{MAPPER_PREFIX}{label}")
    }

    async fn open(&self, runner: &R, path: &Path, mapper: &str, secret: &SecretString) -> Result<()> {
        let image = path.to_string_lossy();
        let output = runner
            .run_with_stdin(
                CRYPTSETUP,
                &["open", "--type", "luks", "--key-file", "-", &image, mapper],
                secret.expose_secret().as_bytes(),
            )
            .await
            .context("cryptsetup open")?;
        ensure_success("cryptsetup open", &output)
    }

    async fn close(&self, mapper: &str) -> Result<()> {
        let output = self
            .runner
            .run(CRYPTSETUP, &["close", mapper])
            .await
            .context("cryptsetup close")?;
        ensure_success("cryptsetup close", &output)
    }

    /// Allocate `path`, LUKS-format it and lay down ext4.
    async fn format_image(&self, path: &Path, size_gb: u32, secret: &SecretString) -> Result<()> {
        let image = path.to_string_lossy();
        let size = format!("{size_gb}G");

        let output = self
            .runner
            .run("truncate", &["-s", &size, &image])
            .await
            .context("truncate")?;
        ensure_success("truncate", &output)?;

        let output = self
            .create_runner
            .run_with_stdin(
                CRYPTSETUP,
                &["luksFormat", "--batch-mode", "--type", "luks2", "--key-file", "-", &image],
                secret.expose_secret().as_bytes(),
            )
            .await
            .context("cryptsetup luksFormat")?;
        ensure_success("cryptsetup luksFormat", &output)?;

        let mapper = self.mapper_name(&self.layout.mount_point_for(path));
        self.open(&self.create_runner, path, &mapper, secret).await?;
        let device = format!("/dev/mapper/{mapper}");
        let formatted = self
            .create_runner
            .run("mkfs.ext4", &["-q", "-L", VOLUME_LABEL, &device])
            .await
            .context("mkfs.ext4")
            .and_then(|o| ensure_success("mkfs.ext4", &o));
        let closed = self.close(&mapper).await;
        formatted?;
        closed
    }
}

impl LuksVolumes<TokioCommandRunner> {
    #[must_use]
    pub fn default_runner() -> Self {
        Self::new(
            MountLayout::for_host(),
            TokioCommandRunner::new(HEAVY_CMD_TIMEOUT),
            TokioCommandRunner::new(VOLUME_CREATE_TIMEOUT),
        )
    }
}

impl<R: CommandRunner> VolumeBoundary for LuksVolumes<R> {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn find_mount_point(&self) -> Option<PathBuf> {
        first_mount_point(&self.layout)
    }

    async fn mount(&self, path: &Path, secret: &SecretString) -> Result<PathBuf> {
        let mount_point = self.layout.mount_point_for(path);
        let mapper = self.mapper_name(&mount_point);
        self.open(&self.runner, path, &mapper, secret).await?;

        std::fs::create_dir_all(&mount_point)
            .with_context(|| format!("cannot create {}", mount_point.display()))?;
        let device = format!("/dev/mapper/{mapper}");
        let mp = mount_point.to_string_lossy();
        let mounted = self
            .runner
            .run("mount", &[&device, &mp])
            .await
            .context("mount")
            .and_then(|o| ensure_success("mount", &o));
        if let Err(e) = mounted {
            // Leave no open mapping behind a failed mount.
            if let Err(close_err) = self.close(&mapper).await {
                tracing::warn!(mapper, error = %close_err, "could not close mapping after failed mount");
            }
            let _ = std::fs::remove_dir(&mount_point);
            return Err(e);
        }
        Ok(mount_point)
    }

    async fn unmount(&self, mount_point: &Path) -> Result<()> {
        let mp = mount_point.to_string_lossy();
        let output = self
            .runner
            .run("umount", &[&mp])
            .await
            .context("umount")?;
        ensure_success("umount", &output)?;
        self.close(&self.mapper_name(mount_point)).await?;
        if let Err(e) = std::fs::remove_dir(mount_point) {
            tracing::debug!(mount = %mount_point.display(), error = %e, "mount directory left behind");
        }
        Ok(())
    }

    async fn create(&self, path: &Path, size_gb: u32, secret: &SecretString) -> Result<()> {
        if path.exists() {
            return Err(PreconditionError::VolumeAlreadyExists(path.to_path_buf()).into());
        }
        ensure_parent(path)?;
        let formatted = self.format_image(path, size_gb, secret).await;
        if formatted.is_err() && path.exists() {
            // A half-written image would read as an existing volume.
            if let Err(e) = std::fs::remove_file(path) {
                tracing::warn!(image = %path.display(), error = %e, "could not remove partial image");
            }
        }
        formatted
    }
}
