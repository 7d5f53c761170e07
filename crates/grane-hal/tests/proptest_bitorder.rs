//! Property-based tests for outcome bit-order handling.
//!
//! The wire convention is rightmost-character-is-qubit-0; encoding a
//! bit-vector to a string and parsing it back must be lossless for every
//! supported width.

use grane_hal::{MAX_BUFFER_QUBITS, Outcome};
use proptest::prelude::*;

/// Generate a (width, value) pair with the value within the width.
fn arb_bits() -> impl Strategy<Value = (usize, u32)> {
    (1usize..=MAX_BUFFER_QUBITS).prop_flat_map(|width| (Just(width), 0u32..(1u32 << width)))
}

fn to_bitstring(value: u32, width: usize) -> String {
    (0..width)
        .rev()
        .map(|q| if (value >> q) & 1 == 1 { '1' } else { '0' })
        .collect()
}

proptest! {
    #[test]
    fn roundtrip_preserves_every_bit((width, value) in arb_bits()) {
        let encoded = to_bitstring(value, width);
        let outcome = Outcome::from_bitstring(&encoded).unwrap();

        prop_assert_eq!(outcome.width(), width);
        for q in 0..width {
            prop_assert_eq!(outcome.bit(q), (value >> q) & 1 == 1);
        }
        prop_assert_eq!(outcome.to_string(), encoded);
    }

    #[test]
    fn leftmost_char_is_most_significant(width in 1usize..=MAX_BUFFER_QUBITS) {
        // A lone '1' in the leftmost position is qubit width-1.
        let mut s = "0".repeat(width);
        s.replace_range(0..1, "1");
        let outcome = Outcome::from_bitstring(&s).unwrap();
        prop_assert!(outcome.bit(width - 1));
        prop_assert_eq!(outcome.count_ones(), 1);
    }
}
