//! Application services — use-case orchestration.
//!
//! Every service takes its collaborators as `&impl Port` so commands can
//! inject real adapters and tests can inject recording mocks.

pub mod config_service;
pub mod detect;
pub mod project;
pub mod readiness;
pub mod session_start;
pub mod session_status;
pub mod session_stop;
pub mod volume_lock;
