use std::fmt;

use crate::error::{CivError, Result};

/// Operating mode as the IC-7100 reports it in command 0x04 / sets it with 0x06.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatingMode {
    Lsb,
    Usb,
    Am,
    Cw,
    Rtty,
    Fm,
    Wfm,
    CwR,
    RttyR,
    /// D-STAR digital voice.
    Dv,
}

impl OperatingMode {
    pub fn from_civ_byte(byte: u8) -> Result<Self> {
        Ok(match byte {
            0x00 => Self::Lsb,
            0x01 => Self::Usb,
            0x02 => Self::Am,
            0x03 => Self::Cw,
            0x04 => Self::Rtty,
            0x05 => Self::Fm,
            0x06 => Self::Wfm,
            0x07 => Self::CwR,
            0x08 => Self::RttyR,
            0x17 => Self::Dv,
            other => return Err(CivError::UnknownMode(other)),
        })
    }

    pub fn to_civ_byte(self) -> u8 {
        match self {
            Self::Lsb => 0x00,
            Self::Usb => 0x01,
            Self::Am => 0x02,
            Self::Cw => 0x03,
            Self::Rtty => 0x04,
            Self::Fm => 0x05,
            Self::Wfm => 0x06,
            Self::CwR => 0x07,
            Self::RttyR => 0x08,
            Self::Dv => 0x17,
        }
    }
}

impl fmt::Display for OperatingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Lsb => "LSB",
            Self::Usb => "USB",
            Self::Am => "AM",
            Self::Cw => "CW",
            Self::Rtty => "RTTY",
            Self::Fm => "FM",
            Self::Wfm => "WFM",
            Self::CwR => "CW-R",
            Self::RttyR => "RTTY-R",
            Self::Dv => "DV",
        };
        f.write_str(name)
    }
}

/// IF filter selection. Shared by the mode command and the data-mode command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Filter {
    #[default]
    Fil1,
    Fil2,
    Fil3,
}

impl Filter {
    pub fn from_civ_byte(byte: u8) -> Result<Self> {
        match byte {
            0x01 => Ok(Self::Fil1),
            0x02 => Ok(Self::Fil2),
            0x03 => Ok(Self::Fil3),
            other => Err(CivError::InvalidArgument(format!(
                "filter byte {other:#04x}"
            ))),
        }
    }

    pub fn to_civ_byte(self) -> u8 {
        match self {
            Self::Fil1 => 0x01,
            Self::Fil2 => 0x02,
            Self::Fil3 => 0x03,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_bytes() {
        for mode in [
            OperatingMode::Lsb,
            OperatingMode::Usb,
            OperatingMode::Fm,
            OperatingMode::RttyR,
            OperatingMode::Dv,
        ] {
            assert_eq!(OperatingMode::from_civ_byte(mode.to_civ_byte()).unwrap(), mode);
        }
        assert_eq!(OperatingMode::Dv.to_civ_byte(), 0x17);
    }

    #[test]
    fn test_unknown_mode() {
        assert!(matches!(
            OperatingMode::from_civ_byte(0x12),
            Err(CivError::UnknownMode(0x12))
        ));
    }

    #[test]
    fn test_filter_bytes() {
        assert_eq!(Filter::from_civ_byte(0x02).unwrap(), Filter::Fil2);
        assert_eq!(Filter::Fil3.to_civ_byte(), 0x03);
        assert!(Filter::from_civ_byte(0x00).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(OperatingMode::CwR.to_string(), "CW-R");
        assert_eq!(OperatingMode::Fm.to_string(), "FM");
    }
}
