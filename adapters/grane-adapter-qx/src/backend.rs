//! Quantum Experience accelerator: translate, submit, poll, decode.

use rustc_hash::FxHashMap;
use tokio::sync::RwLock;

use async_trait::async_trait;
use grane_hal::{
    Accelerator, BackendAvailability, HalResult, JobId, JobStatus, MeasurementBuffer,
};
use grane_ir::Circuit;

use crate::api::{BackendSelector, JobResponse, QasmEntry, QxClient, SubmitRequest};
use crate::catalog::{BackendCatalog, RemoteBackend};
use crate::config::QxConfig;
use crate::error::{QxError, QxResult};
use crate::translate::translate;

/// Quantum Experience backend adapter.
///
/// Holds the API client, the catalog loaded at connect time and the
/// per-job translation bookkeeping the decoder needs. The catalog is
/// immutable after [`QxAccelerator::connect`]; only the in-flight job
/// table is ever written.
pub struct QxAccelerator {
    /// API client, authenticated at connect time.
    client: QxClient,
    /// Backend metadata from the discovery payload.
    catalog: BackendCatalog,
    /// Adapter configuration.
    config: QxConfig,
    /// Measured-qubit lists per in-flight job, keyed by job id and
    /// index-aligned with the submitted circuits. Entries are removed
    /// when the job's results are collected.
    in_flight: RwLock<FxHashMap<JobId, Vec<Vec<u32>>>>,
}

impl std::fmt::Debug for QxAccelerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QxAccelerator")
            .field("client", &self.client)
            .field("config", &self.config)
            .field("backends", &self.catalog.len())
            .finish()
    }
}

impl QxAccelerator {
    /// Log in and load the backend catalog.
    ///
    /// Fails fast on a missing API key, a rejected login, or a selected
    /// backend the discovery payload does not know about.
    pub async fn connect(config: QxConfig) -> QxResult<Self> {
        let api_key = config.api_key.as_deref().ok_or(QxError::MissingApiKey)?;

        let client = QxClient::login(config.url.clone(), api_key).await?;
        let catalog = BackendCatalog::from_descriptors(client.list_backends().await?);
        tracing::info!(backends = catalog.len(), "loaded backend catalog");

        // The selected backend must exist before anything is submitted.
        catalog.lookup(&config.backend)?;

        Ok(Self {
            client,
            catalog,
            config,
            in_flight: RwLock::new(FxHashMap::default()),
        })
    }

    /// The loaded backend catalog.
    pub fn catalog(&self) -> &BackendCatalog {
        &self.catalog
    }

    /// The adapter configuration.
    pub fn config(&self) -> &QxConfig {
        &self.config
    }

    /// The configured backend's catalog entry.
    pub fn selected_backend(&self) -> QxResult<&RemoteBackend> {
        self.catalog.lookup(&self.config.backend)
    }

    async fn submit_circuits(&self, circuits: &[Circuit], shots: u32) -> QxResult<JobId> {
        let backend = self.selected_backend()?;
        ensure_submittable(backend)?;

        let mut qasms = Vec::with_capacity(circuits.len());
        let mut measured_per_circuit = Vec::with_capacity(circuits.len());
        for circuit in circuits {
            let translation = translate(circuit)?;

            if let Some(dir) = &self.config.write_qasm_dir {
                let path = dir.join(format!("{}.qasm", circuit.name()));
                std::fs::write(&path, &translation.qasm)?;
                tracing::debug!(path = %path.display(), "wrote assembly dump");
            }

            // Raw text; the JSON serializer escapes the newlines on the
            // wire and the server decodes them back.
            qasms.push(QasmEntry {
                qasm: translation.qasm,
            });
            measured_per_circuit.push(translation.measured_qubits);
        }

        let request = SubmitRequest {
            qasms,
            shots,
            max_credits: self.config.max_credits,
            backend: BackendSelector {
                name: backend.name.clone(),
            },
        };

        let response = self.client.submit_job(&request).await?;
        let job = JobId::new(response.id);
        self.in_flight
            .write()
            .await
            .insert(job.clone(), measured_per_circuit);

        tracing::info!(job = %job, backend = %backend.name, shots, "submitted job");
        Ok(job)
    }

    async fn job_status(&self, job: &JobId) -> QxResult<JobStatus> {
        let response = self.client.get_job(&job.0).await?;

        // Progress reporting only; the queue info never changes control
        // flow.
        if let Some(queue) = &response.info_queue {
            tracing::info!(
                job = %job,
                queue = %queue.status,
                position = queue.position,
                "job queued"
            );
        }

        Ok(map_status(&response))
    }

    async fn collect_into(
        &self,
        job: &JobId,
        buffer: &mut MeasurementBuffer,
    ) -> QxResult<Vec<MeasurementBuffer>> {
        let response = self.client.get_job(&job.0).await?;
        self.decode_completed(job, &response, buffer).await
    }

    /// Decode a terminal response into measurement buffers.
    ///
    /// The in-flight entry is removed only after a successful decode, so
    /// a retried collect sees the real error instead of `JobNotFound`.
    async fn decode_completed(
        &self,
        job: &JobId,
        response: &JobResponse,
        buffer: &mut MeasurementBuffer,
    ) -> QxResult<Vec<MeasurementBuffer>> {
        match map_status(response) {
            JobStatus::Completed => {}
            JobStatus::Errored(msg) => return Err(QxError::JobFailed(msg)),
            status => {
                return Err(QxError::Decoding(format!(
                    "job {job} is not completed (status {status})"
                )));
            }
        }

        let measured_per_circuit = self
            .in_flight
            .read()
            .await
            .get(job)
            .cloned()
            .ok_or_else(|| QxError::JobNotFound(job.0.clone()))?;

        let histograms = response.histograms()?;
        let is_simulator = self.selected_backend()?.is_simulator;

        let buffers = crate::decode::decode_histograms(
            &histograms,
            buffer,
            &measured_per_circuit,
            is_simulator,
        )?;
        self.in_flight.write().await.remove(job);
        Ok(buffers)
    }
}

/// Check that a backend accepts submissions.
///
/// Called before the payload is even built so that an offline backend
/// never causes a network call.
fn ensure_submittable(backend: &RemoteBackend) -> QxResult<()> {
    if backend.online {
        Ok(())
    } else {
        Err(QxError::BackendOffline(backend.name.clone()))
    }
}

/// Map a polling response onto the job state machine.
fn map_status(response: &JobResponse) -> JobStatus {
    match response.status.as_deref() {
        Some(s) if s.contains("COMPLETED") => JobStatus::Completed,
        Some(s) if s.contains("ERROR") => JobStatus::Errored(s.to_string()),
        Some(s) if s.contains("RUNNING") => JobStatus::Running,
        _ => JobStatus::Submitted,
    }
}

#[async_trait]
impl Accelerator for QxAccelerator {
    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "qx"
    }

    async fn availability(&self) -> HalResult<BackendAvailability> {
        let backend = self.selected_backend()?;
        if backend.online {
            Ok(BackendAvailability {
                is_available: true,
                queue_depth: None,
                status_message: Some(backend.description.clone()),
            })
        } else {
            Ok(BackendAvailability::unavailable("backend status is off"))
        }
    }

    async fn submit(&self, circuits: &[Circuit], shots: u32) -> HalResult<JobId> {
        Ok(self.submit_circuits(circuits, shots).await?)
    }

    async fn status(&self, job: &JobId) -> HalResult<JobStatus> {
        Ok(self.job_status(job).await?)
    }

    async fn collect(
        &self,
        job: &JobId,
        buffer: &mut MeasurementBuffer,
    ) -> HalResult<Vec<MeasurementBuffer>> {
        Ok(self.collect_into(job, buffer).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::BackendDescriptor;

    fn catalog() -> BackendCatalog {
        let descriptors: Vec<BackendDescriptor> = serde_json::from_str(
            r#"[
                {"name": "ibmqx_qasm_simulator", "status": "on", "simulator": true},
                {"name": "ibmqx5", "nQubits": 16, "status": "on", "simulator": false},
                {"name": "ibmqx2", "nQubits": 5, "status": "off", "simulator": false}
            ]"#,
        )
        .unwrap();
        BackendCatalog::from_descriptors(descriptors)
    }

    fn accelerator() -> QxAccelerator {
        QxAccelerator {
            client: QxClient::offline("http://localhost:0"),
            catalog: catalog(),
            config: QxConfig::new("test-key"),
            in_flight: RwLock::new(FxHashMap::default()),
        }
    }

    #[test]
    fn test_offline_backend_rejected_before_submission() {
        let catalog = catalog();
        assert!(ensure_submittable(catalog.lookup("ibmqx5").unwrap()).is_ok());
        assert!(matches!(
            ensure_submittable(catalog.lookup("ibmqx2").unwrap()),
            Err(QxError::BackendOffline(name)) if name == "ibmqx2"
        ));
    }

    #[test]
    fn test_map_status() {
        let parse = |json: &str| -> JobResponse { serde_json::from_str(json).unwrap() };

        assert_eq!(
            map_status(&parse(r#"{"status": "COMPLETED"}"#)),
            JobStatus::Completed
        );
        assert_eq!(
            map_status(&parse(r#"{"status": "RUNNING"}"#)),
            JobStatus::Running
        );
        assert_eq!(
            map_status(&parse(r#"{"status": "WAITING_IN_QUEUE"}"#)),
            JobStatus::Submitted
        );
        assert!(matches!(
            map_status(&parse(r#"{"status": "ERROR_RUNNING_JOB"}"#)),
            JobStatus::Errored(_)
        ));
        // No status at all: still pending from the client's perspective.
        assert_eq!(map_status(&parse("{}")), JobStatus::Submitted);
    }

    #[test]
    fn test_submitted_qasm_reaches_server_with_real_newlines() {
        let translation = translate(&Circuit::bell()).unwrap();
        let request = SubmitRequest {
            qasms: vec![QasmEntry {
                qasm: translation.qasm,
            }],
            shots: 1024,
            max_credits: 5,
            backend: BackendSelector {
                name: "ibmqx_qasm_simulator".to_string(),
            },
        };

        // On the wire the newlines are JSON escape sequences, not raw
        // control characters.
        let wire = serde_json::to_string(&request).unwrap();
        assert!(wire.contains("\\n"));
        assert!(!wire.contains('\n'));

        // After the server JSON-decodes the payload the qasm field holds
        // real newlines again, not literal backslash-n sequences.
        let value: serde_json::Value = serde_json::from_str(&wire).unwrap();
        let qasm = value["qasms"][0]["qasm"].as_str().unwrap();
        assert!(qasm.starts_with("OPENQASM 2.0;\n"));
        assert!(!qasm.contains("\\n"));
    }

    #[tokio::test]
    async fn test_failed_decode_keeps_job_collectable() {
        let accelerator = accelerator();
        let job = JobId::from("j1");
        accelerator
            .in_flight
            .write()
            .await
            .insert(job.clone(), vec![vec![0, 1], vec![0, 1]]);

        let mut buffer = MeasurementBuffer::new("b", 2).unwrap();

        // One histogram for two submitted circuits: decoding must fail.
        let short: JobResponse = serde_json::from_str(
            r#"{"status": "COMPLETED", "qasms": [
                {"result": {"data": {"counts": {"00": 1}}}}
            ]}"#,
        )
        .unwrap();
        let err = accelerator
            .decode_completed(&job, &short, &mut buffer)
            .await
            .unwrap_err();
        assert!(matches!(err, QxError::Decoding(_)));

        // The entry survives the failure, so a retry with the full
        // response succeeds.
        let full: JobResponse = serde_json::from_str(
            r#"{"status": "COMPLETED", "qasms": [
                {"result": {"data": {"counts": {"00": 2}}}},
                {"result": {"data": {"counts": {"11": 3}}}}
            ]}"#,
        )
        .unwrap();
        let buffers = accelerator
            .decode_completed(&job, &full, &mut buffer)
            .await
            .unwrap();
        assert_eq!(buffers.len(), 2);
        assert_eq!(buffers[1].counts().get("11"), 3);

        // Collection consumed the entry; the job is gone now.
        assert!(accelerator.in_flight.read().await.is_empty());
        let again = accelerator
            .decode_completed(&job, &full, &mut buffer)
            .await
            .unwrap_err();
        assert!(matches!(again, QxError::JobNotFound(_)));
    }
}
