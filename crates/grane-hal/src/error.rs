//! Error types for the HAL crate.

use thiserror::Error;

/// Errors that can occur in HAL operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HalError {
    /// Configuration error: unknown/offline backend, missing credential.
    /// Surfaced before any network call where detectable in advance.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A response payload carried an explicit error indicator. The raw
    /// body is kept for diagnosis.
    #[error("API error: {0}")]
    Api(String),

    /// An instruction with no known wire encoding.
    #[error("Translation error: {0}")]
    Translation(String),

    /// Result payload inconsistent with the submission (histogram count
    /// mismatch, short bitstring).
    #[error("Decoding error: {0}")]
    Decoding(String),

    /// Backend is not available.
    #[error("Backend not available: {0}")]
    BackendUnavailable(String),

    /// Job execution failed on the backend.
    #[error("Job failed: {0}")]
    JobFailed(String),

    /// Job not found.
    #[error("Job not found: {0}")]
    JobNotFound(String),

    /// Gave up polling a job.
    #[error("Timeout waiting for job {0}")]
    Timeout(String),

    /// Network error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic backend error.
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Result type for HAL operations.
pub type HalResult<T> = Result<T, HalError>;
