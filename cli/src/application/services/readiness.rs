//! Application service — wait until a fresh container accepts sessions.
//!
//! The only place in the client that retries: right after provisioning the
//! container may still be booting, so connection failures are expected for a
//! bounded time.

use std::time::Duration;

use anyhow::Result;

use crate::application::ports::{ProgressReporter, RemoteShell};
use crate::domain::error::DeployError;
use crate::domain::remote::READINESS_PROBE;

/// Default pause between two readiness probes.
pub const READINESS_INTERVAL: Duration = Duration::from_secs(5);

/// Default number of probes, roughly one minute in total.
pub const READINESS_MAX_ATTEMPTS: u32 = 13;

/// Fixed-interval retry policy for the readiness probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for ReadinessPolicy {
    fn default() -> Self {
        Self {
            interval: READINESS_INTERVAL,
            max_attempts: READINESS_MAX_ATTEMPTS,
        }
    }
}

/// Probe the container until it runs a trivial command.
///
/// Returns the number of attempts it took.
///
/// # Errors
///
/// Returns [`DeployError::NotReady`] with the last transport error once every
/// attempt has failed.
pub async fn wait_until_ready(
    shell: &impl RemoteShell,
    policy: ReadinessPolicy,
    reporter: &impl ProgressReporter,
) -> Result<u32> {
    reporter.step("waiting for the container to accept SSH connections...");
    let mut last_error = String::new();
    for attempt in 1..=policy.max_attempts {
        match shell.run(READINESS_PROBE).await {
            Ok(_) => {
                tracing::debug!(attempt, "container is ready");
                reporter.success("container is ready");
                return Ok(attempt);
            }
            Err(e) => {
                tracing::debug!(attempt, error = %format!("{e:#}"), "readiness probe failed");
                last_error = format!("{e:#}");
            }
        }
        if attempt < policy.max_attempts {
            tokio::time::sleep(policy.interval).await;
        }
    }
    Err(DeployError::NotReady {
        attempts: policy.max_attempts,
        last_error,
    }
    .into())
}
