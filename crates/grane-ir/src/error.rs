//! Error types for the IR crate.

use thiserror::Error;

/// Errors that can occur while building or walking circuits.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// A qubit index outside the circuit's register.
    #[error("Qubit index {index} out of range (circuit has {num_qubits} qubits)")]
    QubitOutOfRange {
        /// Offending index.
        index: u32,
        /// Number of qubits in the circuit.
        num_qubits: u32,
    },

    /// A classical bit index outside the circuit's register.
    #[error("Classical bit index {index} out of range (circuit has {num_clbits} bits)")]
    ClbitOutOfRange {
        /// Offending index.
        index: u32,
        /// Number of classical bits in the circuit.
        num_clbits: u32,
    },

    /// Malformed instruction (wrong operand count for its kind).
    #[error("Invalid instruction: {0}")]
    InvalidInstruction(String),
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
