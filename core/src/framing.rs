//! Start sentinel search, character framing and the final LRC check

use crate::error::{DecodeFailure, ErrorKind};
use crate::lrc::check_lrc;
use crate::track2::{decode_group, group_at};
use crate::{BITS_PER_CHAR, DATA_BITS_PER_CHAR, END_SENTINEL, START_SENTINEL_BITS};

/// Characters read from the start sentinel onwards
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framed {
    /// Decoded characters, starting with `;` and ending with `?` when terminated
    pub text: String,
    /// Bit offset where framing stopped: the end sentinel group when terminated,
    /// otherwise the first group that did not fit
    pub offset: usize,
    pub terminated: bool,
}

/// Offset of the first `1101` pattern, the data bits of the start sentinel
pub fn find_start_sentinel(bits: &[u8]) -> Option<usize> {
    bits.windows(DATA_BITS_PER_CHAR)
        .position(|window| window == START_SENTINEL_BITS)
}

/// Read 5-bit characters from `start` until the end sentinel.
///
/// A group is only read while more than five bits remain from its offset, so a
/// group that ends exactly at the end of `bits` is left unread. Running out of
/// bits without an end sentinel is not an error here; the LRC check reports it.
pub fn frame_characters(bits: &[u8], start: usize) -> Result<Framed, DecodeFailure> {
    let mut text = String::new();
    let mut offset = start;
    let mut terminated = false;

    while offset + BITS_PER_CHAR < bits.len() {
        let Some(group) = group_at(bits, offset) else {
            break;
        };
        let character = decode_group(group);
        if !character.parity_ok {
            log::debug!(
                "parity error in {:?} at bit {} after {:?}",
                character.value,
                offset,
                text
            );
            return Err(DecodeFailure::new(ErrorKind::ParityBitCheckFailed, text));
        }

        text.push(character.value);
        if character.value == END_SENTINEL {
            terminated = true;
            break;
        }

        offset += BITS_PER_CHAR;
    }

    Ok(Framed {
        text,
        offset,
        terminated,
    })
}

/// Sentinel search, framing and LRC validation over a recovered bit stream
pub fn parse_track(bits: &[u8]) -> Result<String, DecodeFailure> {
    let start = find_start_sentinel(bits)
        .ok_or_else(|| DecodeFailure::new(ErrorKind::StartSentinelNotFound, ""))?;

    let framed = frame_characters(bits, start)?;
    log::debug!(
        "framed {:?} from bit {} (end sentinel seen: {})",
        framed.text,
        start,
        framed.terminated
    );

    match check_lrc(bits, framed.offset, &framed.text) {
        Ok(_) => Ok(framed.text),
        Err(kind) => Err(DecodeFailure::new(kind, framed.text)),
    }
}
