//! Quantum Experience backend adapter for Grane.
//!
//! Implements the full remote execution pipeline against the v1
//! job-queue REST API: login, backend discovery, circuit translation to
//! OpenQASM 2.0, batched job submission, fixed-interval status polling
//! and histogram decoding back into per-shot measurement buffers.
//!
//! ```ignore
//! use grane_adapter_qx::{QxAccelerator, QxConfig};
//! use grane_hal::{Accelerator, MeasurementBuffer, PollPolicy};
//! use grane_ir::Circuit;
//!
//! let accelerator = QxAccelerator::connect(QxConfig::from_env()?).await?;
//! let mut buffer = MeasurementBuffer::new("bell", 2)?;
//! accelerator
//!     .execute(&mut buffer, &[Circuit::bell()], 1024, &PollPolicy::default())
//!     .await?;
//! ```

pub mod api;
pub mod backend;
pub mod catalog;
pub mod config;
pub mod decode;
pub mod error;
pub mod translate;

pub use api::{BackendDescriptor, Histogram, QxClient, SubmitRequest};
pub use backend::QxAccelerator;
pub use catalog::{BackendCatalog, RemoteBackend};
pub use config::QxConfig;
pub use decode::decode_histograms;
pub use error::{QxError, QxResult};
pub use translate::{Translation, translate};
