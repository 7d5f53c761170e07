//! Quantum Experience REST API client.
//!
//! This module implements the v1 job-queue API:
//! - Login: exchange an API key for an access token
//! - Discovery: list backends and their static metadata
//! - Submitting batched QASM jobs
//! - Polling job status and retrieving result histograms
//!
//! Authentication is an access token passed as a query parameter on every
//! request. Any response that carries an `error` member, and any
//! non-success HTTP status, aborts the pipeline with the raw body kept
//! for diagnosis; nothing at this layer is retried.

use std::collections::BTreeMap;
use std::fmt;

use reqwest::Client;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::error::{QxError, QxResult};

/// Default Quantum Experience API endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://quantumexperience.ng.bluemix.net";

/// One circuit's result histogram: bitstring → occurrence count.
///
/// Bitstrings need not all have equal length in the backend-native
/// encoding; the decoder normalizes them.
pub type Histogram = BTreeMap<String, u64>;

/// Quantum Experience API client.
pub struct QxClient {
    /// HTTP client.
    client: Client,
    /// API endpoint URL.
    endpoint: String,
    /// Access token obtained at login.
    token: String,
}

impl fmt::Debug for QxClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QxClient")
            .field("endpoint", &self.endpoint)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// Login response from `/api/users/loginWithToken`.
#[derive(Debug, Deserialize)]
struct LoginResponse {
    /// The access token for subsequent requests.
    id: String,
}

impl QxClient {
    /// Log in, exchanging the API key for an access token.
    pub async fn login(endpoint: impl Into<String>, api_key: &str) -> QxResult<Self> {
        let endpoint = endpoint.into();

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .connect_timeout(std::time::Duration::from_secs(10))
            .build()?;

        let url = format!("{endpoint}/api/users/loginWithToken");
        let response = client
            .post(&url)
            .form(&[("apiToken", api_key)])
            .send()
            .await?;

        if matches!(
            response.status(),
            reqwest::StatusCode::BAD_REQUEST | reqwest::StatusCode::UNAUTHORIZED
        ) {
            return Err(QxError::InvalidApiKey);
        }
        let login: LoginResponse = parse_checked(response).await?;

        Ok(Self {
            client,
            endpoint,
            token: login.id,
        })
    }

    /// Fetch the discovery payload: every known backend's descriptor.
    pub async fn list_backends(&self) -> QxResult<Vec<BackendDescriptor>> {
        let url = format!(
            "{}/api/Backends?access_token={}",
            self.endpoint, self.token
        );
        let response = self.client.get(&url).send().await?;
        parse_checked(response).await
    }

    /// Submit a batched job.
    pub async fn submit_job(&self, request: &SubmitRequest) -> QxResult<SubmitResponse> {
        let url = format!("{}/api/Jobs?access_token={}", self.endpoint, self.token);
        let response = self.client.post(&url).json(request).send().await?;
        parse_checked(response).await
    }

    /// Query a job by id.
    pub async fn get_job(&self, job_id: &str) -> QxResult<JobResponse> {
        let url = format!(
            "{}/api/Jobs/{}?access_token={}",
            self.endpoint, job_id, self.token
        );
        let response = self.client.get(&url).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(QxError::JobNotFound(job_id.to_string()));
        }
        parse_checked(response).await
    }
}

#[cfg(test)]
impl QxClient {
    /// Client with a canned token for tests that never touch the network.
    pub(crate) fn offline(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            token: "test-token".to_string(),
        }
    }
}

/// Read a response body, rejecting error payloads before deserializing.
///
/// Fatal on non-success status and on any body with a top-level `error`
/// member, independent of HTTP status.
async fn parse_checked<T: DeserializeOwned>(response: reqwest::Response) -> QxResult<T> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(QxError::Api { body });
    }

    let value: serde_json::Value = serde_json::from_str(&body)?;
    if value.get("error").is_some() {
        return Err(QxError::Api { body });
    }

    Ok(serde_json::from_value(value)?)
}

// ============================================================================
// Request types
// ============================================================================

/// Batched job submission payload.
#[derive(Debug, Serialize)]
pub struct SubmitRequest {
    /// Translated circuits, in submission order.
    pub qasms: Vec<QasmEntry>,
    /// Number of shots per circuit.
    pub shots: u32,
    /// Credit ceiling for the job.
    #[serde(rename = "maxCredits")]
    pub max_credits: u32,
    /// Backend selector.
    pub backend: BackendSelector,
}

/// One translated circuit in a submission.
#[derive(Debug, Serialize)]
pub struct QasmEntry {
    /// Raw assembly text. The JSON serializer escapes the newlines; the
    /// server decodes real newlines back out of the payload.
    pub qasm: String,
}

/// Backend selector in a submission.
#[derive(Debug, Serialize)]
pub struct BackendSelector {
    /// Backend name.
    pub name: String,
}

// ============================================================================
// Response types
// ============================================================================

/// A backend descriptor from the discovery payload.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendDescriptor {
    /// Backend name (unique key).
    pub name: String,
    /// Number of qubits; descriptors without one default to 0.
    #[serde(rename = "nQubits", default)]
    pub n_qubits: u32,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Status string; any occurrence of "off" marks the backend offline.
    #[serde(default)]
    pub status: String,
    /// Whether this backend is a simulator.
    pub simulator: bool,
    /// Coupling map; only meaningful for physical backends, and only
    /// parsed when array-typed (simulators report arbitrary shapes here).
    #[serde(rename = "couplingMap", default)]
    pub coupling_map: Option<serde_json::Value>,
}

/// Job submission acknowledgment.
#[derive(Debug, Deserialize)]
pub struct SubmitResponse {
    /// Job ID.
    pub id: String,
    /// Initial job status.
    #[serde(default)]
    pub status: String,
}

/// Job status/result response.
#[derive(Debug, Clone, Deserialize)]
pub struct JobResponse {
    /// Job ID.
    #[serde(default)]
    pub id: Option<String>,
    /// Job status string.
    #[serde(default)]
    pub status: Option<String>,
    /// Queue substructure, used only for progress reporting.
    #[serde(rename = "infoQueue", default)]
    pub info_queue: Option<QueueInfo>,
    /// Per-circuit results, index-aligned with the submission.
    #[serde(default)]
    pub qasms: Option<Vec<QasmResult>>,
}

/// Queue information embedded in a polling response.
#[derive(Debug, Clone, Deserialize)]
pub struct QueueInfo {
    /// Queue status string.
    #[serde(default)]
    pub status: String,
    /// Position in the queue, if reported.
    #[serde(default)]
    pub position: Option<i64>,
}

/// One circuit's slot in a completed-job response.
#[derive(Debug, Clone, Deserialize)]
pub struct QasmResult {
    /// Execution result; absent until the circuit has run.
    #[serde(default)]
    pub result: Option<QasmResultBody>,
}

/// Result body at the fixed `result.data.counts` path.
#[derive(Debug, Clone, Deserialize)]
pub struct QasmResultBody {
    /// Result data.
    pub data: QasmResultData,
}

/// Result data carrying the histogram.
#[derive(Debug, Clone, Deserialize)]
pub struct QasmResultData {
    /// Measurement histogram.
    pub counts: Histogram,
}

impl JobResponse {
    /// Whether the status string carries the COMPLETED token.
    pub fn is_completed(&self) -> bool {
        self.status
            .as_deref()
            .is_some_and(|s| s.contains("COMPLETED"))
    }

    /// Extract one histogram per submitted circuit, index-aligned.
    ///
    /// Fails when the response carries no `qasms` array or any slot is
    /// missing its `result.data.counts`.
    pub fn histograms(&self) -> QxResult<Vec<Histogram>> {
        let qasms = self.qasms.as_ref().ok_or_else(|| QxError::Decoding(
            "completed job response has no qasms array".to_string(),
        ))?;

        qasms
            .iter()
            .enumerate()
            .map(|(i, slot)| {
                slot.result
                    .as_ref()
                    .map(|body| body.data.counts.clone())
                    .ok_or_else(|| {
                        QxError::Decoding(format!("circuit {i} has no result.data.counts"))
                    })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_request_wire_shape() {
        let request = SubmitRequest {
            qasms: vec![
                QasmEntry {
                    qasm: "OPENQASM 2.0;\nqreg q[2];\n".to_string(),
                },
                QasmEntry {
                    qasm: "OPENQASM 2.0;\nqreg q[1];\n".to_string(),
                },
            ],
            shots: 1024,
            max_credits: 5,
            backend: BackendSelector {
                name: "ibmqx_qasm_simulator".to_string(),
            },
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["qasms"].as_array().unwrap().len(), 2);
        assert!(json["qasms"][0]["qasm"].as_str().unwrap().contains("qreg"));
        assert_eq!(json["shots"], 1024);
        assert_eq!(json["maxCredits"], 5);
        assert_eq!(json["backend"]["name"], "ibmqx_qasm_simulator");
    }

    #[test]
    fn test_descriptor_defaults() {
        // nQubits and description are optional in the discovery payload.
        let json = r#"{"name": "ibmqx_qasm_simulator", "status": "on", "simulator": true}"#;
        let descriptor: BackendDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(descriptor.n_qubits, 0);
        assert!(descriptor.description.is_empty());
        assert!(descriptor.simulator);
        assert!(descriptor.coupling_map.is_none());
    }

    #[test]
    fn test_descriptor_full() {
        let json = r#"{
            "name": "ibmqx5",
            "nQubits": 16,
            "description": "16 qubit device",
            "status": "on",
            "simulator": false,
            "couplingMap": [[1, 0], [1, 2], [2, 3]]
        }"#;
        let descriptor: BackendDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(descriptor.n_qubits, 16);
        assert!(descriptor.coupling_map.as_ref().unwrap().is_array());
    }

    #[test]
    fn test_job_response_queue_info() {
        let json = r#"{
            "id": "abc123",
            "status": "RUNNING",
            "infoQueue": {"status": "PENDING_IN_QUEUE", "position": 7}
        }"#;
        let response: JobResponse = serde_json::from_str(json).unwrap();
        assert!(!response.is_completed());
        let queue = response.info_queue.unwrap();
        assert_eq!(queue.status, "PENDING_IN_QUEUE");
        assert_eq!(queue.position, Some(7));
    }

    #[test]
    fn test_job_response_histograms() {
        let json = r#"{
            "id": "abc123",
            "status": "COMPLETED",
            "qasms": [
                {"result": {"data": {"counts": {"00": 512, "11": 512}}}},
                {"result": {"data": {"counts": {"0": 1024}}}}
            ]
        }"#;
        let response: JobResponse = serde_json::from_str(json).unwrap();
        assert!(response.is_completed());

        let histograms = response.histograms().unwrap();
        assert_eq!(histograms.len(), 2);
        assert_eq!(histograms[0]["00"], 512);
        assert_eq!(histograms[1]["0"], 1024);
    }

    #[test]
    fn test_job_response_missing_counts_is_fatal() {
        let json = r#"{"status": "COMPLETED", "qasms": [{}]}"#;
        let response: JobResponse = serde_json::from_str(json).unwrap();
        assert!(matches!(
            response.histograms(),
            Err(QxError::Decoding(_))
        ));
    }

    #[test]
    fn test_job_response_without_qasms_is_fatal() {
        let json = r#"{"status": "COMPLETED"}"#;
        let response: JobResponse = serde_json::from_str(json).unwrap();
        assert!(matches!(response.histograms(), Err(QxError::Decoding(_))));
    }
}
