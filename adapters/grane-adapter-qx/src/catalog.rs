//! Backend catalog built from the discovery payload.
//!
//! Loaded once at connect time and read-only afterwards; the accelerator
//! holds it and passes references around instead of consulting global
//! state.

use rustc_hash::FxHashMap;

use crate::api::BackendDescriptor;
use crate::error::{QxError, QxResult};

/// Static metadata for one remote backend.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteBackend {
    /// Backend name (unique within the catalog).
    pub name: String,
    /// Number of qubits.
    pub n_qubits: u32,
    /// Human-readable description.
    pub description: String,
    /// Whether the backend is accepting jobs.
    pub online: bool,
    /// Whether this is a simulator.
    pub is_simulator: bool,
    /// Permitted two-qubit interaction edges (physical backends only).
    pub couplers: Vec<(u32, u32)>,
}

/// Immutable lookup table of known backends, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct BackendCatalog {
    backends: FxHashMap<String, RemoteBackend>,
}

impl BackendCatalog {
    /// Build the catalog from a discovery payload.
    pub fn from_descriptors(descriptors: Vec<BackendDescriptor>) -> Self {
        let mut backends = FxHashMap::default();
        for descriptor in descriptors {
            let backend = RemoteBackend::from_descriptor(descriptor);
            backends.insert(backend.name.clone(), backend);
        }
        Self { backends }
    }

    /// Look up a backend by name.
    ///
    /// An unknown name is a configuration error: the selected backend
    /// must exist before a submission is constructed.
    pub fn lookup(&self, name: &str) -> QxResult<&RemoteBackend> {
        self.backends
            .get(name)
            .ok_or_else(|| QxError::UnknownBackend(name.to_string()))
    }

    /// Number of known backends.
    pub fn len(&self) -> usize {
        self.backends.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    /// Iterate over all backends in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &RemoteBackend> {
        self.backends.values()
    }

    /// Connectivity edges for a backend.
    ///
    /// Backends that report no couplers (simulators, fully-connected
    /// devices) get the complete graph over their qubits.
    pub fn connectivity(&self, name: &str) -> QxResult<Vec<(u32, u32)>> {
        let backend = self.lookup(name)?;
        if !backend.couplers.is_empty() {
            return Ok(backend.couplers.clone());
        }
        let mut edges = vec![];
        for i in 0..backend.n_qubits {
            for j in (i + 1)..backend.n_qubits {
                edges.push((i, j));
            }
        }
        Ok(edges)
    }
}

impl RemoteBackend {
    fn from_descriptor(descriptor: BackendDescriptor) -> Self {
        // Any "off" in the status string means the device is down.
        let online = !descriptor.status.contains("off");

        // Couplers only apply to physical devices, and only when the
        // discovery payload actually shaped the field as an array.
        let mut couplers = vec![];
        if !descriptor.simulator {
            if let Some(map) = descriptor.coupling_map.as_ref().and_then(|v| v.as_array()) {
                for entry in map {
                    if let (Some(a), Some(b)) = (
                        entry.get(0).and_then(serde_json::Value::as_u64),
                        entry.get(1).and_then(serde_json::Value::as_u64),
                    ) {
                        couplers.push((a as u32, b as u32));
                    }
                }
            }
        }

        Self {
            name: descriptor.name,
            n_qubits: descriptor.n_qubits,
            description: descriptor.description,
            online,
            is_simulator: descriptor.simulator,
            couplers,
        }
    }
}
