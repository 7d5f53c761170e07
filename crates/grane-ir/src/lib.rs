//! Grane instruction-tree circuit representation.
//!
//! A circuit is an ordered tree of instructions: leaves are gates,
//! measurements and barriers; [`InstructionKind::Composite`] nodes group
//! nested instructions (conditional bodies, subroutines). Consumers walk
//! the tree in pre-order via [`Circuit::iter`].

pub mod circuit;
pub mod error;
pub mod instruction;
pub mod qubit;

pub use circuit::Circuit;
pub use error::{IrError, IrResult};
pub use instruction::{Gate, Instruction, InstructionKind};
pub use qubit::{ClbitId, QubitId};
