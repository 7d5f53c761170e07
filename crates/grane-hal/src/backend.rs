//! Accelerator trait: the seam between orchestration and backend adapters.
//!
//! The job lifecycle:
//!
//! ```text
//!   availability() ──→ submit() ──→ status()* ──→ collect()
//!       (async)         (async)      (polled)      (async)
//! ```
//!
//! ## Contract
//!
//! - `submit()` packages all circuits into **one** submission; the job it
//!   returns covers the whole batch.
//! - `status()` MUST be safe to call repeatedly; it never blocks beyond a
//!   single query.
//! - `collect()` MUST only be called once the job is `Completed`. It
//!   appends decoded shots to the caller's buffer and returns one extra
//!   buffer per additional circuit when the batch held more than one.
//! - `wait()` is a provided fixed-interval poll; callers impose deadlines
//!   by capping [`PollPolicy::max_attempts`] or wrapping the future in
//!   `tokio::time::timeout`.

use async_trait::async_trait;

use grane_ir::Circuit;

use crate::error::{HalError, HalResult};
use crate::job::{JobId, JobStatus, PollPolicy, poll_until_terminal};
use crate::result::MeasurementBuffer;

/// Trait for remote or local quantum execution backends.
#[async_trait]
pub trait Accelerator: Send + Sync {
    /// Get the name of this accelerator.
    fn name(&self) -> &str;

    /// Check backend availability.
    async fn availability(&self) -> HalResult<BackendAvailability>;

    /// Submit a batch of circuits for execution.
    ///
    /// Preconditions (checked before any network call): the configured
    /// backend exists and is online. Returns the batch job id.
    async fn submit(&self, circuits: &[Circuit], shots: u32) -> HalResult<JobId>;

    /// Query the current status of a job.
    async fn status(&self, job: &JobId) -> HalResult<JobStatus>;

    /// Decode a completed job's results.
    ///
    /// Shots for the first circuit are appended to `buffer` when the
    /// batch held a single circuit; for multi-circuit batches one buffer
    /// per circuit is returned instead and `buffer` is left untouched.
    async fn collect(
        &self,
        job: &JobId,
        buffer: &mut MeasurementBuffer,
    ) -> HalResult<Vec<MeasurementBuffer>>;

    /// Poll until the job reaches a terminal state.
    ///
    /// Returns `Err(HalError::JobFailed)` for `Errored` jobs so callers
    /// can `?` straight through to `collect`.
    async fn wait(&self, job: &JobId, policy: &PollPolicy) -> HalResult<()> {
        let status = poll_until_terminal(job, || self.status(job), policy).await?;
        match status {
            JobStatus::Completed => Ok(()),
            JobStatus::Errored(msg) => Err(HalError::JobFailed(msg)),
            // poll_until_terminal only returns terminal statuses
            other => Err(HalError::Backend(format!(
                "job {job} stopped polling in non-terminal state {other}"
            ))),
        }
    }

    /// Submit, wait and collect in one call.
    async fn execute(
        &self,
        buffer: &mut MeasurementBuffer,
        circuits: &[Circuit],
        shots: u32,
        policy: &PollPolicy,
    ) -> HalResult<Vec<MeasurementBuffer>> {
        let job = self.submit(circuits, shots).await?;
        tracing::info!(job = %job, circuits = circuits.len(), shots, "job submitted");
        self.wait(&job, policy).await?;
        self.collect(&job, buffer).await
    }
}

/// Backend availability information.
#[derive(Debug, Clone)]
pub struct BackendAvailability {
    /// Whether the backend is currently accepting jobs.
    pub is_available: bool,
    /// Number of jobs currently in queue (if known).
    pub queue_depth: Option<u32>,
    /// Human-readable status message.
    pub status_message: Option<String>,
}

impl BackendAvailability {
    /// Availability for an offline backend.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            is_available: false,
            queue_depth: None,
            status_message: Some(reason.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_availability_unavailable() {
        let avail = BackendAvailability::unavailable("maintenance");
        assert!(!avail.is_available);
        assert_eq!(avail.status_message, Some("maintenance".to_string()));
    }
}
