//! Grane Hardware Abstraction Layer
//!
//! This crate provides a unified interface for submitting circuits to
//! quantum backends and reconciling their results:
//!
//! - The [`Accelerator`] trait for batch submission, status polling and
//!   result collection
//! - [`JobId`]/[`JobStatus`] and the [`PollPolicy`] fixed-interval wait
//! - [`Outcome`] bit-vectors and per-circuit [`MeasurementBuffer`]s
//! - Aggregated [`Counts`] histograms
//!
//! # Example: Running a Circuit
//!
//! ```ignore
//! use grane_hal::{Accelerator, MeasurementBuffer, PollPolicy};
//! use grane_adapter_qx::{QxAccelerator, QxConfig};
//! use grane_ir::Circuit;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let accelerator = QxAccelerator::connect(QxConfig::from_env()?).await?;
//!     let circuit = Circuit::bell();
//!
//!     let mut buffer = MeasurementBuffer::new("bell", 2)?;
//!     let extra = accelerator
//!         .execute(&mut buffer, &[circuit], 1024, &PollPolicy::default())
//!         .await?;
//!     assert!(extra.is_empty());
//!
//!     if let Some((bitstring, count)) = buffer.counts().most_frequent() {
//!         println!("Most frequent: {bitstring} ({count} times)");
//!     }
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod error;
pub mod job;
pub mod result;

pub use backend::{Accelerator, BackendAvailability};
pub use error::{HalError, HalResult};
pub use job::{JobId, JobStatus, PollPolicy, poll_until_terminal};
pub use result::{Counts, MAX_BUFFER_QUBITS, MeasurementBuffer, Outcome};
