//! Domain layer — pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod config;
pub mod container;
pub mod environment;
pub mod error;
pub mod identity;
pub mod session;
pub mod volume;

pub use config::{CapsuleConfig, validate_config_key, validate_config_value};
pub use container::ContainerConfig;
pub use environment::{EnvironmentState, LinkStatus, Observations, SessionPhase};
pub use error::{
    BoundaryError, ConfigError, PreconditionError, SessionError, error_code, is_timeout,
};
pub use identity::{ProjectIdentity, normalize};
pub use session::Session;
pub use volume::{MountLayout, VolumeSource};
