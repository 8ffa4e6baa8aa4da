//! publish::operation
//!
//! Waiting on long-running operations.
//!
//! A submission answered with a `Location` containing `/operations/` is
//! still running server-side. The operation URL is polled until its
//! normalized status reaches a terminal state or the deadline passes.
//!
//! # Status normalization
//!
//! The status is read from `status`, falling back to `state`, and
//! lowercased. Terminals:
//!
//! | Outcome | Values |
//! |---------|--------|
//! | success | `succeeded`, `success`, `completed` |
//! | failure | `failed`, `cancelled`, `canceled` |
//!
//! Anything else (including a missing status) keeps polling.

use std::time::{Duration, Instant};

use serde_json::Value;

use super::sleeper::Sleeper;
use super::PublishError;
use crate::workspace::Workspace;

const SUCCESS_STATES: [&str; 3] = ["succeeded", "success", "completed"];
const FAILURE_STATES: [&str; 3] = ["failed", "cancelled", "canceled"];

/// Where an operation stands after one poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationState {
    Succeeded,
    Failed,
    /// Not terminal; carries the normalized status (possibly empty)
    Pending(String),
}

/// Delay requested by a `Retry-After` header.
///
/// Only whole seconds are honored, with a floor of one second; HTTP dates
/// and anything unparseable fall back to `default`.
///
/// ```
/// use regionforge::publish::parse_retry_after;
/// use std::time::Duration;
///
/// let default = Duration::from_secs(5);
/// assert_eq!(parse_retry_after(Some("7"), default), Duration::from_secs(7));
/// assert_eq!(parse_retry_after(Some("0"), default), Duration::from_secs(1));
/// assert_eq!(parse_retry_after(Some("soon"), default), default);
/// assert_eq!(parse_retry_after(None, default), default);
/// ```
pub fn parse_retry_after(value: Option<&str>, default: Duration) -> Duration {
    let Some(value) = value.map(str::trim) else {
        return default;
    };
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return default;
    }
    value
        .parse::<u64>()
        .map(|secs| Duration::from_secs(secs.max(1)))
        .unwrap_or(default)
}

/// Lowercased `status` (or `state`) of an operation body.
pub fn normalize_status(body: &Value) -> String {
    let field = |key: &str| {
        body.get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    };
    field("status")
        .or_else(|| field("state"))
        .unwrap_or_default()
        .to_lowercase()
}

pub fn classify(body: &Value) -> OperationState {
    let status = normalize_status(body);
    if SUCCESS_STATES.contains(&status.as_str()) {
        OperationState::Succeeded
    } else if FAILURE_STATES.contains(&status.as_str()) {
        OperationState::Failed
    } else {
        OperationState::Pending(status)
    }
}

/// Poll `url` until the operation terminates.
///
/// `first_delay` is slept before the first poll (the submit response's
/// Retry-After) and counts against `timeout`. Elapsed time is the larger
/// of wall-clock time and the total requested sleep, so a sleeper that
/// returns immediately still reaches the deadline.
///
/// # Errors
///
/// - `PublishError::OperationFailed` on a failure terminal
/// - `PublishError::OperationTimeout` once `timeout` has elapsed
/// - `PublishError::Workspace` if polling itself fails after retries
pub async fn wait_for_operation(
    workspace: &dyn Workspace,
    sleeper: &dyn Sleeper,
    url: &str,
    first_delay: Duration,
    timeout: Duration,
    default_poll: Duration,
) -> Result<Value, PublishError> {
    let started = Instant::now();
    let mut slept = Duration::ZERO;

    if !first_delay.is_zero() {
        sleeper.sleep(first_delay).await;
        slept += first_delay;
    }

    loop {
        if started.elapsed().max(slept) >= timeout {
            return Err(PublishError::OperationTimeout {
                url: url.to_string(),
                timeout_secs: timeout.as_secs(),
            });
        }

        let poll = workspace.get_operation(url).await?;
        match classify(&poll.body) {
            OperationState::Succeeded => {
                tracing::debug!(url = %url, "operation succeeded");
                return Ok(poll.body);
            }
            OperationState::Failed => {
                return Err(PublishError::OperationFailed {
                    url: url.to_string(),
                    body: poll.body.to_string(),
                });
            }
            OperationState::Pending(status) => {
                let delay = parse_retry_after(poll.retry_after.as_deref(), default_poll);
                tracing::debug!(
                    url = %url,
                    status = %status,
                    delay_secs = delay.as_secs(),
                    "operation still running"
                );
                sleeper.sleep(delay).await;
                slept += delay;
            }
        }
    }
}
