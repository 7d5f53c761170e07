//! Histogram decoding: backend-native bitstrings to per-shot outcomes.
//!
//! Backends return one frequency-compressed histogram per circuit. The
//! decoder materializes individual shots from the counts, correcting for
//! the backend-native encoding on the way:
//!
//! - simulators group per-register bits with spaces; strip them;
//! - physical devices report the full classical register; keep only the
//!   rightmost `buffer.size()` characters;
//! - on multi-circuit batches, physical devices also report noise on
//!   qubits that were never measured; those bits are forced to 0 so they
//!   cannot skew downstream expectation values.
//!
//! Bit order is rightmost-character-is-qubit-0 throughout.

use grane_hal::{MeasurementBuffer, Outcome};

use crate::api::Histogram;
use crate::error::{QxError, QxResult};

/// Decode one histogram per circuit into per-shot outcome buffers.
///
/// With a single histogram the shots land in the caller's `buffer` and
/// no extra buffers are returned. With k > 1 histograms one fresh buffer
/// per circuit is allocated (named `<buffer-name><i>`, same width) and
/// all k are returned; the caller's buffer is left untouched.
///
/// Fails when the histogram count does not match the measured-qubit list
/// count, or when any bitstring cannot be brought to the buffer width.
pub fn decode_histograms(
    histograms: &[Histogram],
    buffer: &mut MeasurementBuffer,
    measured_per_circuit: &[Vec<u32>],
    is_simulator: bool,
) -> QxResult<Vec<MeasurementBuffer>> {
    if histograms.len() != measured_per_circuit.len() {
        return Err(QxError::Decoding(format!(
            "{} histogram(s) returned for {} submitted circuit(s)",
            histograms.len(),
            measured_per_circuit.len()
        )));
    }

    if let [histogram] = histograms {
        // Single circuit: populate the caller's buffer directly. The
        // full register belongs to this circuit, so no masking applies.
        decode_into(histogram, buffer, None, is_simulator)?;
        return Ok(vec![]);
    }

    let mut buffers = Vec::with_capacity(histograms.len());
    for (i, histogram) in histograms.iter().enumerate() {
        let mut circuit_buffer =
            MeasurementBuffer::new(format!("{}{}", buffer.name(), i), buffer.size())
                .map_err(|e| QxError::Decoding(e.to_string()))?;
        let measured = (!is_simulator).then_some(measured_per_circuit[i].as_slice());
        decode_into(histogram, &mut circuit_buffer, measured, is_simulator)?;
        buffers.push(circuit_buffer);
    }
    Ok(buffers)
}

/// Decode one histogram into one buffer, expanding counts into shots.
fn decode_into(
    histogram: &Histogram,
    buffer: &mut MeasurementBuffer,
    measured: Option<&[u32]>,
    is_simulator: bool,
) -> QxResult<()> {
    for (bitstring, &count) in histogram {
        let corrected = correct_bitstring(bitstring, buffer.size(), is_simulator)?;
        let masked = match measured {
            Some(measured) => mask_unmeasured(&corrected, measured),
            None => corrected,
        };

        let outcome =
            Outcome::from_bitstring(&masked).map_err(|e| QxError::Decoding(e.to_string()))?;
        tracing::debug!(%outcome, count, raw = %bitstring, "measurement outcome");

        // Histograms are frequency-compressed; materialize each shot.
        for _ in 0..count {
            buffer
                .append(outcome)
                .map_err(|e| QxError::Decoding(e.to_string()))?;
        }
    }
    Ok(())
}

/// Normalize a backend-native bitstring to the buffer width.
///
/// Simulators format per-register groups with spaces; physical devices
/// prepend ancilla/unused classical registers, which are discarded from
/// the left. A string that still differs from the buffer width after
/// correction is a fatal inconsistency.
fn correct_bitstring(bitstring: &str, size: usize, is_simulator: bool) -> QxResult<String> {
    let mut s: String = if is_simulator {
        bitstring.chars().filter(|c| !c.is_whitespace()).collect()
    } else {
        bitstring.to_string()
    };

    if !s.is_ascii() {
        return Err(QxError::Decoding(format!(
            "bitstring {bitstring:?} contains non-ASCII characters"
        )));
    }
    if !is_simulator && s.len() > size {
        s = s[s.len() - size..].to_string();
    }

    if s.len() != size {
        return Err(QxError::Decoding(format!(
            "bitstring {bitstring:?} has width {} after correction, buffer expects {size}",
            s.len()
        )));
    }
    Ok(s)
}

/// Force bits of unmeasured qubits to 0.
///
/// The qubit index of a character is its position counted from the
/// right: the rightmost character is qubit 0.
fn mask_unmeasured(bitstring: &str, measured: &[u32]) -> String {
    let width = bitstring.len();
    bitstring
        .chars()
        .enumerate()
        .map(|(pos, c)| {
            let qubit = (width - 1 - pos) as u32;
            if measured.contains(&qubit) { c } else { '0' }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn histogram(entries: &[(&str, u64)]) -> Histogram {
        entries
            .iter()
            .map(|(s, c)| (s.to_string(), *c))
            .collect()
    }

    fn buffer(size: usize) -> MeasurementBuffer {
        MeasurementBuffer::new("test", size).unwrap()
    }

    #[test]
    fn test_single_circuit_simulator() {
        // Three 00 shots and one 11 shot, masking skipped on simulators.
        let histograms = vec![histogram(&[("00", 3), ("11", 1)])];
        let mut buffer = buffer(2);

        let extra =
            decode_histograms(&histograms, &mut buffer, &[vec![0, 1]], true).unwrap();

        assert!(extra.is_empty());
        assert_eq!(buffer.measurements().len(), 4);
        let counts = buffer.counts();
        assert_eq!(counts.get("00"), 3);
        assert_eq!(counts.get("11"), 1);
    }

    #[test]
    fn test_simulator_strips_register_spaces() {
        let histograms = vec![histogram(&[("0 1", 2)])];
        let mut buffer = buffer(2);

        decode_histograms(&histograms, &mut buffer, &[vec![0, 1]], true).unwrap();
        assert_eq!(buffer.counts().get("01"), 2);
    }

    #[test]
    fn test_physical_truncates_to_rightmost_bits() {
        // Device reports a 4-bit register for a 2-qubit buffer; the
        // leftmost bits are unused classical registers.
        let histograms = vec![histogram(&[("0010", 2)])];
        let mut buffer = buffer(2);

        decode_histograms(&histograms, &mut buffer, &[vec![0, 1]], false).unwrap();

        assert_eq!(buffer.measurements().len(), 2);
        assert_eq!(buffer.counts().get("10"), 2);
    }

    #[test]
    fn test_multi_circuit_masks_unmeasured_qubits() {
        // Circuit 1 only measured qubit 0: the qubit-1 bit is noise and
        // must be forced to 0.
        let histograms = vec![
            histogram(&[("00", 5)]),
            histogram(&[("11", 5)]),
        ];
        let mut caller = buffer(2);

        let buffers =
            decode_histograms(&histograms, &mut caller, &[vec![0, 1], vec![0]], false).unwrap();

        assert_eq!(buffers.len(), 2);
        assert!(caller.measurements().is_empty());
        assert_eq!(buffers[0].counts().get("00"), 5);
        assert_eq!(buffers[1].counts().get("01"), 5);
        assert_eq!(buffers[1].counts().get("11"), 0);
    }

    #[test]
    fn test_multi_circuit_buffers_are_index_aligned() {
        let histograms = vec![
            histogram(&[("01", 4)]),
            histogram(&[("10", 6)]),
        ];
        let mut caller = buffer(2);

        let buffers =
            decode_histograms(&histograms, &mut caller, &[vec![0, 1], vec![0, 1]], true).unwrap();

        assert_eq!(buffers[0].name(), "test0");
        assert_eq!(buffers[1].name(), "test1");
        // Each buffer derives only from its own histogram.
        assert_eq!(buffers[0].counts().get("01"), 4);
        assert_eq!(buffers[0].counts().get("10"), 0);
        assert_eq!(buffers[1].counts().get("10"), 6);
    }

    #[test]
    fn test_expansion_preserves_total_shots() {
        let histograms = vec![histogram(&[("000", 7), ("101", 2), ("111", 11)])];
        let mut buffer = buffer(3);

        decode_histograms(&histograms, &mut buffer, &[vec![0, 1, 2]], true).unwrap();
        assert_eq!(buffer.measurements().len(), 20);
        assert_eq!(buffer.counts().total_shots(), 20);
    }

    #[test]
    fn test_histogram_count_mismatch_is_fatal() {
        let histograms = vec![histogram(&[("0", 1)])];
        let mut buffer = buffer(1);

        let result = decode_histograms(&histograms, &mut buffer, &[vec![0], vec![0]], true);
        assert!(matches!(result, Err(QxError::Decoding(_))));
    }

    #[test]
    fn test_short_bitstring_is_fatal() {
        let histograms = vec![histogram(&[("1", 1)])];
        let mut buffer = buffer(3);

        let result = decode_histograms(&histograms, &mut buffer, &[vec![0]], false);
        assert!(matches!(result, Err(QxError::Decoding(_))));
    }

    #[test]
    fn test_masking_is_idempotent() {
        let measured = vec![0, 2];
        let once = mask_unmeasured("1111", &measured);
        let twice = mask_unmeasured(&once, &measured);
        assert_eq!(once, "0101");
        assert_eq!(once, twice);
    }

    #[test]
    fn test_masking_positions_count_from_the_right() {
        // Qubit 0 is the rightmost character.
        assert_eq!(mask_unmeasured("11", &[0]), "01");
        assert_eq!(mask_unmeasured("11", &[1]), "10");
        assert_eq!(mask_unmeasured("1111", &[3]), "1000");
    }

    #[test]
    fn test_duplicate_measurements_do_not_confuse_masking() {
        // A qubit measured twice is still just "measured".
        assert_eq!(mask_unmeasured("11", &[0, 0]), "01");
    }
}
