//! Bounded polling for a container to report "running".

use std::time::Duration;

use anyhow::Result;

use crate::application::ports::ContainerBoundary;
use crate::domain::SessionError;

/// Fixed retry count for the readiness poll.
pub const READY_MAX_ATTEMPTS: u32 = 10;

/// Fixed delay between readiness attempts.
pub const READY_RETRY_DELAY: Duration = Duration::from_millis(500);

/// How long and how often to poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: READY_MAX_ATTEMPTS,
            delay: READY_RETRY_DELAY,
        }
    }
}

/// Poll until the container reports running.
///
/// Total wait is bounded by `attempts * delay`; the delay is skipped after the
/// final attempt.
///
/// # Errors
///
/// Returns [`SessionError::ContainerNotReady`] once every attempt has failed.
pub async fn wait_until_running(
    containers: &impl ContainerBoundary,
    name: &str,
    policy: RetryPolicy,
) -> Result<()> {
    let attempts = policy.attempts.max(1);
    for attempt in 1..=attempts {
        if containers.running(name).await {
            tracing::debug!(container = name, attempt, "container is running");
            return Ok(());
        }
        tracing::debug!(container = name, attempt, "container not running yet");
        if attempt < attempts {
            tokio::time::sleep(policy.delay).await;
        }
    }
    Err(SessionError::ContainerNotReady {
        name: name.to_string(),
        attempts,
    }
    .into())
}
