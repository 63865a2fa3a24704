use std::fmt;

use crate::bcd;
use crate::error::{CivError, Result};

/// Highest value a 10-digit BCD frequency field can carry.
const MAX_HZ: u64 = 9_999_999_999;

/// An operating frequency, held in Hz.
///
/// On the wire it is 5 little-endian BCD bytes (10 digits, 1 Hz steps).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Frequency(pub(crate) u64);

impl Frequency {
    pub fn from_hz(hz: u64) -> Result<Self> {
        if hz > MAX_HZ {
            return Err(CivError::FrequencyOutOfRange(hz));
        }
        Ok(Self(hz))
    }

    /// Build from decimal MHz, rounded to the nearest Hz.
    pub fn from_mhz(mhz: f64) -> Result<Self> {
        if !mhz.is_finite() || mhz < 0.0 {
            return Err(CivError::InvalidArgument(format!("frequency {mhz} MHz")));
        }
        Self::from_hz((mhz * 1_000_000.0).round() as u64)
    }

    pub fn hz(self) -> u64 {
        self.0
    }

    pub fn mhz(self) -> f64 {
        self.0 as f64 / 1_000_000.0
    }

    pub fn from_bcd(bytes: [u8; 5]) -> Result<Self> {
        Self::from_hz(bcd::decode_le(&bytes)?)
    }

    pub fn to_bcd(self) -> Result<[u8; 5]> {
        let mut out = [0u8; 5];
        out.copy_from_slice(&bcd::encode_le(self.0, 5)?);
        Ok(out)
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mhz = self.0 / 1_000_000;
        let khz = (self.0 % 1_000_000) / 1_000;
        let hz = self.0 % 1_000;
        write!(f, "{mhz}.{khz:03}.{hz:03} MHz")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_mhz_rounds() {
        let freq = Frequency::from_mhz(146.960).unwrap();
        assert_eq!(freq.hz(), 146_960_000);
    }

    #[test]
    fn test_from_mhz_rejects_negative() {
        assert!(Frequency::from_mhz(-1.0).is_err());
        assert!(Frequency::from_mhz(f64::NAN).is_err());
    }

    #[test]
    fn test_out_of_range() {
        assert!(matches!(
            Frequency::from_hz(10_000_000_000),
            Err(CivError::FrequencyOutOfRange(_))
        ));
    }

    #[test]
    fn test_to_bcd_uhf() {
        let freq = Frequency::from_hz(446_000_000).unwrap();
        assert_eq!(freq.to_bcd().unwrap(), [0x00, 0x00, 0x00, 0x46, 0x04]);
    }

    #[test]
    fn test_from_bcd_hf() {
        let freq = Frequency::from_bcd([0x00, 0x40, 0x07, 0x14, 0x00]).unwrap();
        assert_eq!(freq.hz(), 14_074_000);
    }

    #[test]
    fn test_display() {
        let freq = Frequency::from_hz(146_960_000).unwrap();
        assert_eq!(freq.to_string(), "146.960.000 MHz");
    }

    #[test]
    fn test_mhz_view() {
        let freq = Frequency::from_hz(7_074_000).unwrap();
        assert!((freq.mhz() - 7.074).abs() < 1e-9);
    }
}
