//! High-level circuit builder API and pre-order traversal.

use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::instruction::{Gate, Instruction, InstructionKind};
use crate::qubit::{ClbitId, QubitId};

/// A quantum circuit: a named, ordered tree of instructions over a fixed
/// qubit and classical-bit register.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    /// Name of the circuit.
    name: String,
    /// Number of qubits.
    num_qubits: u32,
    /// Number of classical bits.
    num_clbits: u32,
    /// Top-level instructions in program order.
    instructions: Vec<Instruction>,
}

impl Circuit {
    /// Create a circuit with a given number of qubits and classical bits.
    pub fn with_size(name: impl Into<String>, num_qubits: u32, num_clbits: u32) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            num_clbits,
            instructions: vec![],
        }
    }

    /// Create a two-qubit Bell state circuit with both qubits measured.
    pub fn bell() -> Self {
        let mut circuit = Self::with_size("bell", 2, 2);
        circuit
            .h(QubitId(0))
            .and_then(|c| c.cx(QubitId(0), QubitId(1)))
            .and_then(|c| c.measure(QubitId(0), ClbitId(0)))
            .and_then(|c| c.measure(QubitId(1), ClbitId(1)))
            .expect("bell circuit operands are in range");
        circuit
    }

    /// Name of the circuit.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of qubits.
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// Number of classical bits.
    pub fn num_clbits(&self) -> u32 {
        self.num_clbits
    }

    /// Top-level instructions in program order.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Append an instruction, validating its operands against the registers.
    pub fn push(&mut self, instruction: Instruction) -> IrResult<&mut Self> {
        self.validate(&instruction)?;
        self.instructions.push(instruction);
        Ok(self)
    }

    fn validate(&self, instruction: &Instruction) -> IrResult<()> {
        for q in &instruction.qubits {
            if q.0 >= self.num_qubits {
                return Err(IrError::QubitOutOfRange {
                    index: q.0,
                    num_qubits: self.num_qubits,
                });
            }
        }
        for c in &instruction.clbits {
            if c.0 >= self.num_clbits {
                return Err(IrError::ClbitOutOfRange {
                    index: c.0,
                    num_clbits: self.num_clbits,
                });
            }
        }
        if let InstructionKind::Gate(gate) = &instruction.kind {
            if instruction.qubits.len() != gate.arity() {
                return Err(IrError::InvalidInstruction(format!(
                    "{gate:?} expects {} qubit operand(s), got {}",
                    gate.arity(),
                    instruction.qubits.len()
                )));
            }
        }
        if let InstructionKind::Composite(children) = &instruction.kind {
            for child in children {
                self.validate(child)?;
            }
        }
        Ok(())
    }

    /// Apply a Hadamard gate.
    pub fn h(&mut self, q: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::gate(Gate::H, [q]))
    }

    /// Apply a Pauli X gate.
    pub fn x(&mut self, q: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::gate(Gate::X, [q]))
    }

    /// Apply a Pauli Z gate.
    pub fn z(&mut self, q: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::gate(Gate::Z, [q]))
    }

    /// Apply a controlled-X gate.
    pub fn cx(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::gate(Gate::Cx, [control, target]))
    }

    /// Apply a Z rotation.
    pub fn rz(&mut self, q: QubitId, angle: f64) -> IrResult<&mut Self> {
        self.push(Instruction::gate(Gate::Rz(angle), [q]))
    }

    /// Measure a qubit into a classical bit.
    pub fn measure(&mut self, q: QubitId, c: ClbitId) -> IrResult<&mut Self> {
        self.push(Instruction::measure(q, c))
    }

    /// Walk the instruction tree in pre-order.
    ///
    /// A compound node is yielded before its children. Disabled leaves are
    /// still yielded (consumers check `enabled`), but a disabled compound
    /// node prunes its entire subtree.
    pub fn iter(&self) -> InstructionIter<'_> {
        InstructionIter {
            stack: self.instructions.iter().rev().collect(),
        }
    }
}

/// Pre-order iterator over a circuit's instruction tree.
pub struct InstructionIter<'a> {
    stack: Vec<&'a Instruction>,
}

impl<'a> Iterator for InstructionIter<'a> {
    type Item = &'a Instruction;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.stack.pop()?;
        if next.enabled {
            if let Some(children) = next.children() {
                for child in children.iter().rev() {
                    self.stack.push(child);
                }
            }
        }
        Some(next)
    }
}

impl<'a> IntoIterator for &'a Circuit {
    type Item = &'a Instruction;
    type IntoIter = InstructionIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bell_structure() {
        let circuit = Circuit::bell();
        assert_eq!(circuit.num_qubits(), 2);
        assert_eq!(circuit.instructions().len(), 4);
        assert!(circuit.instructions()[2].is_measure());
    }

    #[test]
    fn test_operand_validation() {
        let mut circuit = Circuit::with_size("t", 1, 1);
        assert!(circuit.h(QubitId(0)).is_ok());
        assert!(matches!(
            circuit.h(QubitId(1)),
            Err(IrError::QubitOutOfRange { index: 1, .. })
        ));
        assert!(matches!(
            circuit.measure(QubitId(0), ClbitId(5)),
            Err(IrError::ClbitOutOfRange { index: 5, .. })
        ));
    }

    #[test]
    fn test_gate_arity_validation() {
        let mut circuit = Circuit::with_size("t", 2, 0);
        let bad = Instruction::gate(Gate::Cx, [QubitId(0)]);
        assert!(matches!(
            circuit.push(bad),
            Err(IrError::InvalidInstruction(_))
        ));
    }

    #[test]
    fn test_preorder_yields_composite_before_children() {
        let mut circuit = Circuit::with_size("t", 2, 2);
        circuit.h(QubitId(0)).unwrap();
        circuit
            .push(Instruction::composite([
                Instruction::gate(Gate::X, [QubitId(1)]),
                Instruction::measure(QubitId(1), ClbitId(1)),
            ]))
            .unwrap();
        circuit.measure(QubitId(0), ClbitId(0)).unwrap();

        let kinds: Vec<_> = circuit.iter().map(|i| std::mem::discriminant(&i.kind)).collect();
        assert_eq!(kinds.len(), 5);
        // h, composite, x, measure(q1), measure(q0)
        assert!(matches!(
            circuit.iter().nth(1).unwrap().kind,
            InstructionKind::Composite(_)
        ));
        assert!(matches!(
            circuit.iter().nth(2).unwrap().kind,
            InstructionKind::Gate(Gate::X)
        ));
    }

    #[test]
    fn test_disabled_composite_prunes_subtree() {
        let mut circuit = Circuit::with_size("t", 2, 2);
        circuit.h(QubitId(0)).unwrap();
        circuit
            .push(
                Instruction::composite([Instruction::gate(Gate::X, [QubitId(1)])]).disabled(),
            )
            .unwrap();

        let visited: Vec<_> = circuit.iter().collect();
        // h + the disabled composite itself; the nested x is pruned
        assert_eq!(visited.len(), 2);
        assert!(!visited[1].enabled);
    }

    #[test]
    fn test_disabled_leaf_still_yielded() {
        let mut circuit = Circuit::with_size("t", 1, 0);
        circuit
            .push(Instruction::gate(Gate::X, [QubitId(0)]).disabled())
            .unwrap();
        let visited: Vec<_> = circuit.iter().collect();
        assert_eq!(visited.len(), 1);
        assert!(!visited[0].enabled);
    }
}
