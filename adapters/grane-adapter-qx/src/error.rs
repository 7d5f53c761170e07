//! Error types for the Quantum Experience adapter.

use thiserror::Error;

/// Result type for QX operations.
pub type QxResult<T> = Result<T, QxError>;

/// Errors that can occur when talking to a Quantum Experience endpoint.
#[derive(Debug, Error)]
pub enum QxError {
    /// Missing API key.
    #[error(
        "Quantum Experience API key not found. Put a `key:` line in ~/.qx_config, point QX_CONFIG at a config file, or set QX_API_KEY."
    )]
    MissingApiKey,

    /// Login rejected the API key.
    #[error("Invalid Quantum Experience API key")]
    InvalidApiKey,

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API returned an error payload. The raw body is kept for
    /// diagnosis.
    #[error("Quantum Experience API error: {body}")]
    Api {
        /// Raw response body.
        body: String,
    },

    /// Malformed configuration value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Requested backend does not exist in the catalog.
    #[error("Backend {0} is not available")]
    UnknownBackend(String),

    /// Requested backend exists but is not accepting jobs.
    #[error("Backend {0} is currently unavailable, status = off")]
    BackendOffline(String),

    /// An instruction with no known OpenQASM encoding.
    #[error("Cannot translate instruction: {0}")]
    Translation(String),

    /// Result payload inconsistent with the submission.
    #[error("Decoding error: {0}")]
    Decoding(String),

    /// Job failed on the backend.
    #[error("Job failed: {0}")]
    JobFailed(String),

    /// Job not found.
    #[error("Job not found: {0}")]
    JobNotFound(String),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Side-file dump failed.
    #[error("Failed to write assembly dump: {0}")]
    Io(#[from] std::io::Error),
}

impl From<QxError> for grane_hal::HalError {
    fn from(e: QxError) -> Self {
        match e {
            QxError::MissingApiKey
            | QxError::InvalidApiKey
            | QxError::InvalidConfig(_)
            | QxError::UnknownBackend(_)
            | QxError::BackendOffline(_) => grane_hal::HalError::Configuration(e.to_string()),
            QxError::Api { body } => grane_hal::HalError::Api(body),
            QxError::Translation(msg) => grane_hal::HalError::Translation(msg),
            QxError::Decoding(msg) => grane_hal::HalError::Decoding(msg),
            QxError::JobFailed(msg) => grane_hal::HalError::JobFailed(msg),
            QxError::JobNotFound(id) => grane_hal::HalError::JobNotFound(id),
            QxError::Http(e) => grane_hal::HalError::Network(e),
            QxError::Json(e) => grane_hal::HalError::Serialization(e),
            QxError::Io(e) => grane_hal::HalError::Backend(e.to_string()),
        }
    }
}
