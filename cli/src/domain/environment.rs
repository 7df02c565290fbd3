//! Point-in-time snapshot of the three session resources.
//!
//! Never persisted. Every command re-derives it from the live system.

use std::path::{Path, PathBuf};

use serde::Serialize;

/// Result of inspecting the workspace docs link.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LinkStatus {
    /// The path itself is a symlink.
    pub exists: bool,
    /// It is a symlink whose target cannot be resolved.
    pub broken: bool,
}

/// Raw observations collected by the detector before invariants are applied.
#[derive(Debug, Clone, Default)]
pub struct Observations {
    pub volume_path: PathBuf,
    pub volume_exists: bool,
    pub mount_point: Option<PathBuf>,
    pub container_exists: bool,
    pub container_running: bool,
    pub link: LinkStatus,
}

/// Consistent snapshot of volume, container and link state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvironmentState {
    pub volume_exists: bool,
    pub volume_path: PathBuf,
    pub volume_mounted: bool,
    pub mount_point: Option<PathBuf>,
    pub container_exists: bool,
    pub container_running: bool,
    pub symlink_exists: bool,
    pub symlink_broken: bool,
}

impl EnvironmentState {
    /// Build a snapshot, enforcing `mounted ⇒ exists`, `running ⇒ exists`
    /// and `broken ⇒ symlink exists`.
    #[must_use]
    pub fn from_observations(obs: Observations) -> Self {
        let volume_mounted = obs.volume_exists && obs.mount_point.is_some();
        Self {
            volume_exists: obs.volume_exists,
            volume_path: obs.volume_path,
            volume_mounted,
            mount_point: if volume_mounted { obs.mount_point } else { None },
            container_exists: obs.container_exists,
            container_running: obs.container_exists && obs.container_running,
            symlink_exists: obs.link.exists,
            symlink_broken: obs.link.exists && obs.link.broken,
        }
    }

    /// The live mount point, when mounted.
    #[must_use]
    pub fn mount_point(&self) -> Option<&Path> {
        self.mount_point.as_deref()
    }

    /// `true` when the docs link is present and resolves.
    #[must_use]
    pub fn symlink_healthy(&self) -> bool {
        self.symlink_exists && !self.symlink_broken
    }

    /// Where this snapshot sits in the session state machine.
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        match (self.volume_mounted, self.container_running, self.symlink_healthy()) {
            (false, _, _) => SessionPhase::Locked,
            (true, false, _) => SessionPhase::Mounted,
            (true, true, false) => SessionPhase::ContainerUp,
            (true, true, true) => SessionPhase::Ready,
        }
    }

    /// Stable `KEY=VALUE` pairs for scripting.
    #[must_use]
    pub fn report_pairs(&self, container_name: &str) -> Vec<(&'static str, String)> {
        vec![
            ("VOLUME_PATH", self.volume_path.display().to_string()),
            ("VOLUME_EXISTS", self.volume_exists.to_string()),
            ("MOUNTED", self.volume_mounted.to_string()),
            ("MOUNT_POINT", self.mount_point_display()),
            ("CONTAINER", container_name.to_string()),
            ("CONTAINER_EXISTS", self.container_exists.to_string()),
            ("CONTAINER_RUNNING", self.container_running.to_string()),
            ("SYMLINK_EXISTS", self.symlink_exists.to_string()),
            ("SYMLINK_BROKEN", self.symlink_broken.to_string()),
            ("PHASE", self.phase().as_str().to_string()),
        ]
    }

    /// Mount point as a string, empty when not mounted.
    #[must_use]
    pub fn mount_point_display(&self) -> String {
        self.mount_point
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_default()
    }
}

/// Per-project lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Volume not mounted.
    Locked,
    /// Volume mounted, no running container.
    Mounted,
    /// Container running, docs link missing or broken.
    ContainerUp,
    /// Everything in place.
    Ready,
}

impl SessionPhase {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Locked => "locked",
            Self::Mounted => "mounted",
            Self::ContainerUp => "container_up",
            Self::Ready => "ready",
        }
    }
}
