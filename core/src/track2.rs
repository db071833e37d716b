//! Track 2 character code
//!
//! Each character is four data bits, least significant first, followed by an odd
//! parity bit. The data nibble is added to `0x30`, so the alphabet is `0`-`9`
//! plus `:;<=>?`, with `;` and `?` reserved as start and end sentinels.

use crate::error::{MagstripeError, Result};
use crate::lrc::column_parity;
use crate::{BITS_PER_CHAR, CHAR_BASE, DATA_BITS_PER_CHAR, END_SENTINEL, START_SENTINEL};

/// One decoded 5-bit group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Character {
    pub value: char,
    pub parity_ok: bool,
}

/// Decode one transmitted group
pub fn decode_group(group: &[u8; BITS_PER_CHAR]) -> Character {
    let nibble = group[..DATA_BITS_PER_CHAR]
        .iter()
        .enumerate()
        .fold(0u8, |acc, (weight, &bit)| acc + (bit << weight));
    let ones: u32 = group.iter().map(|&bit| bit as u32).sum();

    Character {
        value: (CHAR_BASE + nibble) as char,
        parity_ok: ones % 2 == 1,
    }
}

/// The five-bit group starting at `offset`, if `bits` holds all of it
pub fn group_at(bits: &[u8], offset: usize) -> Option<&[u8; BITS_PER_CHAR]> {
    let end = offset.checked_add(BITS_PER_CHAR)?;
    bits.get(offset..end)?.try_into().ok()
}

/// Data nibble of a track 2 character
pub fn nibble(c: char) -> Result<u8> {
    let code = c as u32;
    if !(CHAR_BASE as u32..CHAR_BASE as u32 + 16).contains(&code) {
        return Err(MagstripeError::InvalidCharacter(c));
    }
    Ok(code as u8 - CHAR_BASE)
}

/// Five transmitted bits for a data nibble: LSB first, then odd parity
pub fn encode_nibble(nibble: u8) -> [u8; BITS_PER_CHAR] {
    let mut group = [0u8; BITS_PER_CHAR];
    for (weight, bit) in group.iter_mut().take(DATA_BITS_PER_CHAR).enumerate() {
        *bit = (nibble >> weight) & 1;
    }
    let ones = (nibble & 0x0F).count_ones();
    group[DATA_BITS_PER_CHAR] = if ones % 2 == 0 { 1 } else { 0 };
    group
}

/// Wrap card data in sentinels, rejecting anything track 2 cannot carry
pub fn framed_text(data: &str) -> Result<String> {
    if data.is_empty() {
        return Err(MagstripeError::EmptyInput);
    }
    for c in data.chars() {
        nibble(c)?;
        if c == START_SENTINEL || c == END_SENTINEL {
            return Err(MagstripeError::InvalidCharacter(c));
        }
    }
    Ok(format!("{}{}{}", START_SENTINEL, data, END_SENTINEL))
}

/// Full bit image of a track: zero padding, `;`, data, `?`, LRC, zero padding
pub fn frame_bits(data: &str, leading_zeros: usize, trailing_zeros: usize) -> Result<Vec<u8>> {
    let text = framed_text(data)?;
    let mut bits = vec![0u8; leading_zeros];
    bits.reserve((text.len() + 1) * BITS_PER_CHAR + trailing_zeros);

    for c in text.chars() {
        bits.extend_from_slice(&encode_nibble(nibble(c)?));
    }
    bits.extend_from_slice(&encode_nibble(column_parity(&text)));
    bits.resize(bits.len() + trailing_zeros, 0);

    Ok(bits)
}
