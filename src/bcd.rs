//! Packed BCD helpers. CI-V carries frequencies as little-endian BCD and
//! levels/meters as big-endian BCD, two decimal digits per byte.

use crate::error::{CivError, Result};

/// Unpack one BCD byte (`0x00`..=`0x99`) into 0–99.
pub fn from_bcd(byte: u8) -> Result<u8> {
    let (tens, ones) = (byte >> 4, byte & 0x0F);
    if tens > 9 || ones > 9 {
        return Err(CivError::InvalidBcd(byte));
    }
    Ok(tens * 10 + ones)
}

/// Pack 0–99 into one BCD byte.
pub fn to_bcd(value: u8) -> Result<u8> {
    if value > 99 {
        return Err(CivError::InvalidBcd(value));
    }
    Ok(((value / 10) << 4) | (value % 10))
}

/// Decode little-endian BCD (least-significant digit pair first).
pub fn decode_le(bytes: &[u8]) -> Result<u64> {
    bytes
        .iter()
        .rev()
        .try_fold(0u64, |acc, &b| Ok(acc * 100 + from_bcd(b)? as u64))
}

/// Encode into exactly `len` bytes of little-endian BCD.
///
/// Digits that do not fit in `len` bytes are dropped.
pub fn encode_le(value: u64, len: usize) -> Result<Vec<u8>> {
    let mut rest = value;
    (0..len)
        .map(|_| {
            let pair = (rest % 100) as u8;
            rest /= 100;
            to_bcd(pair)
        })
        .collect()
}

/// Decode big-endian BCD (most-significant digit pair first).
pub fn decode_be(bytes: &[u8]) -> Result<u64> {
    bytes
        .iter()
        .try_fold(0u64, |acc, &b| Ok(acc * 100 + from_bcd(b)? as u64))
}

/// Encode into exactly `len` bytes of big-endian BCD.
pub fn encode_be(value: u64, len: usize) -> Result<Vec<u8>> {
    let mut out = encode_le(value, len)?;
    out.reverse();
    Ok(out)
}
