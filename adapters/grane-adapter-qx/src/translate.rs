//! Circuit-to-OpenQASM translation.
//!
//! Walks the instruction tree in pre-order, emits one assembly line per
//! enabled leaf and records which qubits received an explicit measurement
//! instruction. The measured-qubit list is in traversal (program) order
//! and keeps duplicates; the decoder needs it to mask unmeasured bits on
//! physical backends.

use grane_ir::{Circuit, Gate, InstructionKind};

use crate::error::{QxError, QxResult};

/// Result of translating one circuit.
#[derive(Debug, Clone, PartialEq)]
pub struct Translation {
    /// OpenQASM 2.0 source with real newlines.
    pub qasm: String,
    /// Qubit indices measured, in program order, duplicates preserved.
    pub measured_qubits: Vec<u32>,
}

/// Translate one circuit to OpenQASM 2.0.
///
/// An instruction kind with no assembly encoding is a fatal error; it is
/// never silently skipped.
pub fn translate(circuit: &Circuit) -> QxResult<Translation> {
    let mut qasm = String::new();
    let mut measured_qubits = vec![];

    qasm.push_str("OPENQASM 2.0;\n");
    qasm.push_str("include \"qelib1.inc\";\n");
    if circuit.num_qubits() > 0 {
        qasm.push_str(&format!("qreg q[{}];\n", circuit.num_qubits()));
    }
    if circuit.num_clbits() > 0 {
        qasm.push_str(&format!("creg c[{}];\n", circuit.num_clbits()));
    }

    for instruction in circuit.iter() {
        if !instruction.enabled {
            continue;
        }
        match &instruction.kind {
            InstructionKind::Gate(gate) => {
                qasm.push_str(&emit_gate(*gate, &instruction.qubits));
            }
            InstructionKind::Measure => {
                let (qubit, clbit) = match (instruction.qubits.first(), instruction.clbits.first())
                {
                    (Some(q), Some(c)) => (q, c),
                    _ => {
                        return Err(QxError::Translation(
                            "measure instruction is missing its operands".to_string(),
                        ));
                    }
                };
                qasm.push_str(&format!("measure q[{}] -> c[{}];\n", qubit.0, clbit.0));
                measured_qubits.push(qubit.0);
            }
            InstructionKind::Reset => {
                let qubit = instruction.qubits.first().ok_or_else(|| {
                    QxError::Translation("reset instruction is missing its operand".to_string())
                })?;
                qasm.push_str(&format!("reset q[{}];\n", qubit.0));
            }
            InstructionKind::Barrier => {
                let operands: Vec<String> = instruction
                    .qubits
                    .iter()
                    .map(|q| format!("q[{}]", q.0))
                    .collect();
                qasm.push_str(&format!("barrier {};\n", operands.join(",")));
            }
            InstructionKind::Delay { duration } => {
                return Err(QxError::Translation(format!(
                    "delay[{duration}] has no OpenQASM 2.0 encoding"
                )));
            }
            // Structural node: children are emitted by the traversal.
            InstructionKind::Composite(_) => {}
        }
    }

    Ok(Translation {
        qasm,
        measured_qubits,
    })
}

fn emit_gate(gate: Gate, qubits: &[grane_ir::QubitId]) -> String {
    let operands: Vec<String> = qubits.iter().map(|q| format!("q[{}]", q.0)).collect();
    let operands = operands.join(",");
    let name = match gate {
        Gate::I => "id".to_string(),
        Gate::X => "x".to_string(),
        Gate::Y => "y".to_string(),
        Gate::Z => "z".to_string(),
        Gate::H => "h".to_string(),
        Gate::S => "s".to_string(),
        Gate::Sdg => "sdg".to_string(),
        Gate::T => "t".to_string(),
        Gate::Tdg => "tdg".to_string(),
        Gate::Rx(theta) => format!("rx({theta})"),
        Gate::Ry(theta) => format!("ry({theta})"),
        Gate::Rz(theta) => format!("rz({theta})"),
        Gate::U(theta, phi, lambda) => format!("u3({theta},{phi},{lambda})"),
        Gate::Cx => "cx".to_string(),
        Gate::Cz => "cz".to_string(),
        Gate::Swap => "swap".to_string(),
    };
    format!("{name} {operands};\n")
}
