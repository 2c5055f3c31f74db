//! Bounded waiting for asynchronous stack operations.
//!
//! Provides a generic fixed-interval poll loop used for both create and
//! delete completion. Elapsed time is accounted from the sleeps taken, so a
//! given status sequence always yields the same elapsed value.

use crate::openstack::ApiError;
use heat_probe_common::defaults::POLL_INTERVAL;
use heat_probe_common::StackStatus;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Configuration for a bounded poll.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Delay between two status checks
    pub interval: Duration,
    /// Budget after which the wait gives up
    pub timeout: Duration,
}

impl PollConfig {
    /// Poll every [`POLL_INTERVAL`] up to `timeout`.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            interval: POLL_INTERVAL,
            timeout,
        }
    }
}

/// An asynchronous operation reached a terminal non-success status
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Stack is in {} state{}", .status.state, reason_suffix(.status))]
pub struct FailedOperation {
    pub status: StackStatus,
}

fn reason_suffix(status: &StackStatus) -> String {
    status
        .reason
        .as_deref()
        .map(|r| format!(": {r}"))
        .unwrap_or_default()
}

/// Result of a bounded poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollResult {
    /// Operation completed after `elapsed`
    Complete { elapsed: Duration },
    /// Operation reported a terminal failure
    Failed(FailedOperation),
    /// Budget exhausted; `elapsed` is at least the timeout
    TimedOut { elapsed: Duration },
}

/// Poll an operation's status until it is terminal or the budget runs out.
///
/// # Arguments
/// * `config` - Interval and timeout
/// * `fetch` - Async function returning the current status
/// * `operation` - Name for logging
///
/// # Returns
/// * `Ok(PollResult::Complete)` - Status reached `COMPLETE`
/// * `Ok(PollResult::Failed)` - Status left `IN_PROGRESS` for anything else
/// * `Ok(PollResult::TimedOut)` - Still in progress when the budget ran out
/// * `Err` - Fetching the status failed
///
/// # Example
/// ```ignore
/// let result = wait_for_completion(
///     &PollConfig::with_timeout(Duration::from_secs(120)),
///     || heat.stack_status(&stack),
///     "stack creation",
/// ).await?;
/// ```
pub async fn wait_for_completion<F, Fut>(
    config: &PollConfig,
    mut fetch: F,
    operation: &str,
) -> Result<PollResult, ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<StackStatus, ApiError>>,
{
    let mut elapsed = Duration::ZERO;

    while elapsed < config.timeout {
        let status = fetch().await?;

        if status.is_complete() {
            debug!(operation, elapsed_secs = elapsed.as_secs(), "Operation complete");
            return Ok(PollResult::Complete { elapsed });
        }

        if !status.is_in_progress() {
            warn!(operation, status = %status, reason = ?status.reason, "Operation failed");
            return Ok(PollResult::Failed(FailedOperation { status }));
        }

        debug!(
            operation,
            status = %status,
            elapsed_secs = elapsed.as_secs(),
            "Operation in progress"
        );
        tokio::time::sleep(config.interval).await;
        elapsed += config.interval;
    }

    warn!(
        operation,
        elapsed_secs = elapsed.as_secs(),
        timeout_secs = config.timeout.as_secs(),
        "Timed out waiting for operation"
    );
    Ok(PollResult::TimedOut { elapsed })
}
