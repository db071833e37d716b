//! Clock recovery and bit assignment
//!
//! A `0` cell produces one transition-to-transition distance of a full cell, a `1`
//! cell produces two distances of half a cell each. The zero-cell length is
//! re-estimated after every decision, so the decoder keeps pace with a swipe
//! that speeds up or slows down.

use crate::error::ErrorKind;
use crate::CALIBRATION_DISTANCES;

/// Bits recovered from the distance sequence, plus the final clock estimate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitStream {
    pub bits: Vec<u8>,
    /// Zero-cell length in samples after the last decision
    pub baseline: usize,
}

/// Convert peak distances to bits.
///
/// The first [`CALIBRATION_DISTANCES`] distances average into the initial zero-cell
/// length; the card format pads both ends with zeros, so those cells are zeros.
/// For each later distance `d` the bit is `1` when `d` is closer to half the
/// baseline than to the baseline. A `1` resets the baseline to `2 * d` and consumes
/// the following distance, the second half of the same cell. A `0` resets it to `d`.
pub fn assign_bits(distances: &[usize]) -> Result<BitStream, ErrorKind> {
    if distances.len() <= CALIBRATION_DISTANCES {
        return Err(ErrorKind::NotEnoughPeaks);
    }

    let mut baseline =
        distances[..CALIBRATION_DISTANCES].iter().sum::<usize>() / CALIBRATION_DISTANCES;
    let mut bits = Vec::with_capacity(distances.len() - CALIBRATION_DISTANCES);

    let mut index = CALIBRATION_DISTANCES;
    while index < distances.len() {
        let distance = distances[index];
        let to_zero = distance.abs_diff(baseline);
        let to_one = distance.abs_diff(baseline / 2);

        if to_one < to_zero {
            bits.push(1);
            baseline = distance * 2;
            index += 1;
        } else {
            bits.push(0);
            baseline = distance;
        }

        index += 1;
    }

    log::trace!("assigned {} bits, final zero-cell length {}", bits.len(), baseline);

    Ok(BitStream { bits, baseline })
}
