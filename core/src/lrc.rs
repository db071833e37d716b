use crate::error::ErrorKind;
use crate::track2::{decode_group, group_at};
use crate::BITS_PER_CHAR;

/// Mod-2 sum of each of the four data-bit columns over `text`, packed as a nibble.
///
/// Bit 3 holds the accumulator for the `0x08` column, bit 0 the one for `0x01`.
pub fn column_parity(text: &str) -> u8 {
    text.bytes().fold(0u8, |acc, b| acc ^ (b & 0x0F))
}

/// Validate the LRC character that follows the end sentinel.
///
/// `end_sentinel_offset` is the bit offset of the end sentinel group; the LRC is
/// the group right after it. `text` is every framed character, sentinels included.
pub fn check_lrc(bits: &[u8], end_sentinel_offset: usize, text: &str) -> Result<char, ErrorKind> {
    let offset = end_sentinel_offset + BITS_PER_CHAR;
    let Some(group) = group_at(bits, offset) else {
        return Err(ErrorKind::NotEnoughDataForLrcCheck);
    };

    let lrc = decode_group(group);
    if !lrc.parity_ok {
        return Err(ErrorKind::LrcParityBitCheckFailed);
    }

    let expected = column_parity(text);
    let received = lrc.value as u8 & 0x0F;
    if expected != received {
        log::debug!(
            "LRC mismatch: computed {:04b}, card carries {:04b}",
            expected,
            received
        );
        return Err(ErrorKind::LrcInvalid);
    }

    Ok(lrc.value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track2::encode_nibble;
    use crate::CHAR_BASE;

    fn bits_of(groups: &[[u8; 5]]) -> Vec<u8> {
        groups.iter().flatten().copied().collect()
    }

    #[test]
    fn test_column_parity() {
        assert_eq!(column_parity(""), 0);
        assert_eq!(column_parity(";1234?"), 0x0);
        assert_eq!(column_parity(";1?"), 0xB ^ 0x1 ^ 0xF);
    }

    #[test]
    fn test_valid_lrc() {
        // ; 1 ? LRC
        let lrc = 0xB ^ 0x1 ^ 0xF;
        let bits = bits_of(&[
            encode_nibble(0xB),
            encode_nibble(0x1),
            encode_nibble(0xF),
            encode_nibble(lrc),
        ]);
        assert_eq!(check_lrc(&bits, 10, ";1?"), Ok((CHAR_BASE + lrc) as char));
    }

    #[test]
    fn test_lrc_failures() {
        let mut bits = bits_of(&[encode_nibble(0xF), encode_nibble(0x4)]);
        assert_eq!(check_lrc(&bits, 0, "?"), Err(ErrorKind::LrcInvalid));

        bits[9] ^= 1;
        assert_eq!(check_lrc(&bits, 0, "?"), Err(ErrorKind::LrcParityBitCheckFailed));

        assert_eq!(
            check_lrc(&bits[..9], 0, "?"),
            Err(ErrorKind::NotEnoughDataForLrcCheck)
        );
    }

    #[test]
    fn test_short_tail_reports_missing_lrc() {
        let bits = bits_of(&[encode_nibble(0xF), encode_nibble(0x0)]);
        for len in 0..bits.len() {
            assert_eq!(
                check_lrc(&bits[..len], 0, "?"),
                Err(ErrorKind::NotEnoughDataForLrcCheck),
                "len {}",
                len
            );
        }
        assert_eq!(check_lrc(&bits, 0, "?"), Err(ErrorKind::LrcInvalid));
    }
}
