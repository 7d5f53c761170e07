//! Circuit instructions and the closed gate set.

use serde::{Deserialize, Serialize};

use crate::qubit::{ClbitId, QubitId};

/// A standard gate.
///
/// Closed set: backends match exhaustively over this enum when encoding
/// circuits for the wire, so adding a variant is a breaking change for
/// every adapter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Gate {
    /// Identity.
    I,
    /// Pauli X.
    X,
    /// Pauli Y.
    Y,
    /// Pauli Z.
    Z,
    /// Hadamard.
    H,
    /// Phase gate S.
    S,
    /// S dagger.
    Sdg,
    /// T gate.
    T,
    /// T dagger.
    Tdg,
    /// X rotation by an angle in radians.
    Rx(f64),
    /// Y rotation by an angle in radians.
    Ry(f64),
    /// Z rotation by an angle in radians.
    Rz(f64),
    /// Generic single-qubit rotation u(theta, phi, lambda).
    U(f64, f64, f64),
    /// Controlled X.
    Cx,
    /// Controlled Z.
    Cz,
    /// Swap.
    Swap,
}

impl Gate {
    /// Number of qubit operands this gate expects.
    pub fn arity(&self) -> usize {
        match self {
            Gate::Cx | Gate::Cz | Gate::Swap => 2,
            _ => 1,
        }
    }
}

/// The kind of instruction in a circuit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InstructionKind {
    /// A quantum gate operation.
    Gate(Gate),
    /// Measurement of one qubit into one classical bit.
    Measure,
    /// Reset qubit to |0>.
    Reset,
    /// Barrier (synchronization point).
    Barrier,
    /// Delay instruction in device-specific units.
    Delay {
        /// Duration in device-specific units.
        duration: u64,
    },
    /// A compound node grouping nested instructions.
    ///
    /// Conditional bodies and subroutines land here; the node itself
    /// carries no operation, only structure.
    Composite(Vec<Instruction>),
}

/// A complete instruction with operands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    /// The kind of instruction.
    pub kind: InstructionKind,
    /// Qubits this instruction operates on.
    pub qubits: Vec<QubitId>,
    /// Classical bits this instruction operates on (for measure).
    pub clbits: Vec<ClbitId>,
    /// Whether this instruction takes part in execution.
    ///
    /// Disabled leaves are skipped; a disabled composite prunes its
    /// whole subtree.
    pub enabled: bool,
}

impl Instruction {
    /// Create a gate instruction.
    pub fn gate(gate: Gate, qubits: impl IntoIterator<Item = QubitId>) -> Self {
        Self {
            kind: InstructionKind::Gate(gate),
            qubits: qubits.into_iter().collect(),
            clbits: vec![],
            enabled: true,
        }
    }

    /// Create a measurement instruction.
    pub fn measure(qubit: QubitId, clbit: ClbitId) -> Self {
        Self {
            kind: InstructionKind::Measure,
            qubits: vec![qubit],
            clbits: vec![clbit],
            enabled: true,
        }
    }

    /// Create a reset instruction.
    pub fn reset(qubit: QubitId) -> Self {
        Self {
            kind: InstructionKind::Reset,
            qubits: vec![qubit],
            clbits: vec![],
            enabled: true,
        }
    }

    /// Create a barrier instruction.
    pub fn barrier(qubits: impl IntoIterator<Item = QubitId>) -> Self {
        Self {
            kind: InstructionKind::Barrier,
            qubits: qubits.into_iter().collect(),
            clbits: vec![],
            enabled: true,
        }
    }

    /// Create a delay instruction.
    pub fn delay(qubit: QubitId, duration: u64) -> Self {
        Self {
            kind: InstructionKind::Delay { duration },
            qubits: vec![qubit],
            clbits: vec![],
            enabled: true,
        }
    }

    /// Create a compound node from nested instructions.
    pub fn composite(children: impl IntoIterator<Item = Instruction>) -> Self {
        Self {
            kind: InstructionKind::Composite(children.into_iter().collect()),
            qubits: vec![],
            clbits: vec![],
            enabled: true,
        }
    }

    /// Disable this instruction.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Whether this is a measurement.
    pub fn is_measure(&self) -> bool {
        matches!(self.kind, InstructionKind::Measure)
    }

    /// Nested instructions, if this is a compound node.
    pub fn children(&self) -> Option<&[Instruction]> {
        match &self.kind {
            InstructionKind::Composite(children) => Some(children),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_arity() {
        assert_eq!(Gate::H.arity(), 1);
        assert_eq!(Gate::Rz(0.5).arity(), 1);
        assert_eq!(Gate::Cx.arity(), 2);
        assert_eq!(Gate::Swap.arity(), 2);
    }

    #[test]
    fn test_measure_operands() {
        let inst = Instruction::measure(QubitId(3), ClbitId(3));
        assert!(inst.is_measure());
        assert_eq!(inst.qubits, vec![QubitId(3)]);
        assert_eq!(inst.clbits, vec![ClbitId(3)]);
        assert!(inst.enabled);
    }

    #[test]
    fn test_disabled_builder() {
        let inst = Instruction::gate(Gate::X, [QubitId(0)]).disabled();
        assert!(!inst.enabled);
    }

    #[test]
    fn test_composite_children() {
        let node = Instruction::composite([
            Instruction::gate(Gate::H, [QubitId(0)]),
            Instruction::measure(QubitId(0), ClbitId(0)),
        ]);
        assert_eq!(node.children().unwrap().len(), 2);
        assert!(Instruction::gate(Gate::H, [QubitId(0)]).children().is_none());
    }
}
