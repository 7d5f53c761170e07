//! Job lifecycle types and the polling policy.
//!
//! The job state machine:
//!
//! ```text
//!   submit() ──→ Submitted ──→ Running ──→ Completed
//!                   │             │
//!                   └─────────────┴──→ Errored(reason)
//! ```
//!
//! **Invariants:**
//! - Transitions are monotonic — a job never moves backward.
//! - Terminal states (`Completed`, `Errored`) are permanent; a terminal
//!   job is never polled again.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{HalError, HalResult};

/// Unique identifier for a job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub String);

impl JobId {
    /// Create a new job ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Status of a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    /// Job was accepted and is waiting in queue.
    Submitted,
    /// Job is currently running.
    Running,
    /// Job completed successfully.
    Completed,
    /// Job failed with an error message.
    Errored(String),
}

impl JobStatus {
    /// Check if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Errored(_))
    }

    /// Check if the job completed successfully.
    pub fn is_completed(&self) -> bool {
        matches!(self, JobStatus::Completed)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Submitted => write!(f, "Submitted"),
            JobStatus::Running => write!(f, "Running"),
            JobStatus::Completed => write!(f, "Completed"),
            JobStatus::Errored(msg) => write!(f, "Errored: {msg}"),
        }
    }
}

/// Fixed-interval polling policy.
///
/// The default matches the historical behavior: a 100 ms wait between
/// status queries, no attempt cap. A caller that needs a deadline caps
/// `max_attempts` or wraps the wait in `tokio::time::timeout`; both
/// compose because the wait is a plain future.
#[derive(Debug, Clone, Copy)]
pub struct PollPolicy {
    /// Wait between consecutive status queries.
    pub interval: Duration,
    /// Give up after this many queries (`None` = poll until terminal).
    pub max_attempts: Option<u32>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(100),
            max_attempts: None,
        }
    }
}

impl PollPolicy {
    /// Policy with a custom interval and no attempt cap.
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            max_attempts: None,
        }
    }

    /// Cap the number of status queries.
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts);
        self
    }
}

/// Poll `fetch` at the policy's fixed interval until it reports a
/// terminal status.
///
/// Non-terminal statuses are an expected intermediate condition, not an
/// error; anything `fetch` itself fails with is propagated immediately.
/// Returns `HalError::Timeout` when `max_attempts` runs out first.
pub async fn poll_until_terminal<F, Fut>(
    job: &JobId,
    mut fetch: F,
    policy: &PollPolicy,
) -> HalResult<JobStatus>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = HalResult<JobStatus>>,
{
    let mut attempts = 0u32;
    loop {
        let status = fetch().await?;
        if status.is_terminal() {
            return Ok(status);
        }

        attempts += 1;
        if let Some(max) = policy.max_attempts {
            if attempts >= max {
                return Err(HalError::Timeout(job.0.clone()));
            }
        }
        tokio::time::sleep(policy.interval).await;
    }
}
