//! Measurement outcomes, per-circuit buffers and aggregated counts.
//!
//! Bit-order convention: in a bitstring the leftmost character is the
//! most-significant qubit (index `width - 1`) and the rightmost character
//! is qubit 0. [`Outcome`] preserves this convention on both directions
//! of the conversion.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{HalError, HalResult};

/// Maximum buffer width. Backends report classical registers as plain
/// bitstrings; 30 bits keeps every outcome addressable in a `u32`.
pub const MAX_BUFFER_QUBITS: usize = 30;

/// One shot's measurement outcome: a fixed-width bit-vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Outcome {
    bits: u32,
    width: usize,
}

impl Outcome {
    /// Parse a bitstring, leftmost character = qubit `width - 1`.
    ///
    /// Fails on empty strings, strings longer than [`MAX_BUFFER_QUBITS`]
    /// and characters other than '0'/'1'.
    pub fn from_bitstring(s: &str) -> HalResult<Self> {
        if s.is_empty() || s.len() > MAX_BUFFER_QUBITS {
            return Err(HalError::Decoding(format!(
                "bitstring width {} outside 1..={MAX_BUFFER_QUBITS}",
                s.len()
            )));
        }
        let mut bits = 0u32;
        for c in s.chars() {
            bits <<= 1;
            match c {
                '0' => {}
                '1' => bits |= 1,
                other => {
                    return Err(HalError::Decoding(format!(
                        "invalid character {other:?} in bitstring {s:?}"
                    )));
                }
            }
        }
        Ok(Self {
            bits,
            width: s.len(),
        })
    }

    /// Number of qubits in this outcome.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Value of the bit for qubit `q` (qubit 0 = rightmost character).
    pub fn bit(&self, q: usize) -> bool {
        q < self.width && (self.bits >> q) & 1 == 1
    }

    /// Number of qubits measured as 1.
    pub fn count_ones(&self) -> u32 {
        self.bits.count_ones()
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for q in (0..self.width).rev() {
            write!(f, "{}", u8::from(self.bit(q)))?;
        }
        Ok(())
    }
}

/// Per-circuit shot buffer.
///
/// Holds one [`Outcome`] per executed shot, in the order the decoder
/// appended them. The decoder's sole side effect is [`Self::append`].
#[derive(Debug, Clone)]
pub struct MeasurementBuffer {
    name: String,
    size: usize,
    measurements: Vec<Outcome>,
}

impl MeasurementBuffer {
    /// Create a buffer for `size` qubits.
    ///
    /// `size` must be within `1..=`[`MAX_BUFFER_QUBITS`].
    pub fn new(name: impl Into<String>, size: usize) -> HalResult<Self> {
        if size == 0 || size > MAX_BUFFER_QUBITS {
            return Err(HalError::Configuration(format!(
                "invalid buffer size {size}, expected 1..={MAX_BUFFER_QUBITS}"
            )));
        }
        Ok(Self {
            name: name.into(),
            size,
            measurements: vec![],
        })
    }

    /// Buffer name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Qubit width of this buffer.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Recorded shots in append order.
    pub fn measurements(&self) -> &[Outcome] {
        &self.measurements
    }

    /// Append one shot outcome.
    ///
    /// The outcome width must match the buffer width.
    pub fn append(&mut self, outcome: Outcome) -> HalResult<()> {
        if outcome.width() != self.size {
            return Err(HalError::Decoding(format!(
                "outcome width {} does not match buffer width {}",
                outcome.width(),
                self.size
            )));
        }
        self.measurements.push(outcome);
        Ok(())
    }

    /// Aggregate the recorded shots into a histogram.
    pub fn counts(&self) -> Counts {
        let mut counts = Counts::new();
        for outcome in &self.measurements {
            counts.add(outcome.to_string());
        }
        counts
    }

    /// Z-basis expectation value over all recorded shots: mean of the
    /// global parity, in [-1, 1]. Returns 0 for an empty buffer.
    pub fn expectation_value_z(&self) -> f64 {
        if self.measurements.is_empty() {
            return 0.0;
        }
        let signed: i64 = self
            .measurements
            .iter()
            .map(|m| if m.count_ones() % 2 == 0 { 1i64 } else { -1i64 })
            .sum();
        signed as f64 / self.measurements.len() as f64
    }
}

/// Aggregated measurement counts: bitstring → number of occurrences.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Counts {
    map: FxHashMap<String, u64>,
}

impl Counts {
    /// Create an empty count map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or overwrite) the count for a bitstring.
    pub fn insert(&mut self, bitstring: impl Into<String>, count: u64) {
        self.map.insert(bitstring.into(), count);
    }

    /// Record one more occurrence of a bitstring.
    pub fn add(&mut self, bitstring: impl Into<String>) {
        *self.map.entry(bitstring.into()).or_insert(0) += 1;
    }

    /// Count for a bitstring (0 when absent).
    pub fn get(&self, bitstring: &str) -> u64 {
        self.map.get(bitstring).copied().unwrap_or(0)
    }

    /// Total number of shots across all bitstrings.
    pub fn total_shots(&self) -> u64 {
        self.map.values().sum()
    }

    /// The most frequent outcome, if any.
    pub fn most_frequent(&self) -> Option<(&str, u64)> {
        self.map
            .iter()
            .max_by_key(|&(_, &count)| count)
            .map(|(bitstring, &count)| (bitstring.as_str(), count))
    }

    /// Iterate over (bitstring, count) pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.map.iter().map(|(k, &v)| (k.as_str(), v))
    }

    /// Whether no shots were recorded.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
