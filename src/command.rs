use crate::bcd;
use crate::error::Result;
use crate::frequency::Frequency;
use crate::mode::{Filter, OperatingMode};
use crate::protocol::Frame;

/// CI-V command bytes used by this controller.
pub mod cmd {
    /// Read the displayed frequency.
    pub const READ_FREQ: u8 = 0x03;
    /// Read the operating mode and filter.
    pub const READ_MODE: u8 = 0x04;
    /// Set the operating frequency.
    pub const SET_FREQ: u8 = 0x05;
    /// Set the operating mode and filter.
    pub const SET_MODE: u8 = 0x06;
    /// Select a memory channel, or a memory bank with sub-command 0xA0.
    pub const MEMORY: u8 = 0x08;
    /// Read/write level settings.
    pub const LEVEL: u8 = 0x14;
    /// Read meters.
    pub const METER: u8 = 0x15;
    /// Power on/off.
    pub const POWER: u8 = 0x18;
    /// Miscellaneous settings, including data mode.
    pub const SETTINGS: u8 = 0x1A;
    /// Transceiver status (PTT).
    pub const TX_STATUS: u8 = 0x1C;
}

/// Sub-commands for MEMORY (0x08).
pub mod memory_sub {
    pub const BANK: u8 = 0xA0;
}

/// Sub-commands for LEVEL (0x14).
pub mod level_sub {
    pub const RF_POWER: u8 = 0x0A;
}

/// Sub-commands for METER (0x15).
pub mod meter_sub {
    pub const S_METER: u8 = 0x02;
    pub const SWR: u8 = 0x12;
}

/// Sub-commands for POWER (0x18).
pub mod power_sub {
    pub const OFF: u8 = 0x00;
    pub const ON: u8 = 0x01;
}

/// Sub-commands for SETTINGS (0x1A).
pub mod settings_sub {
    pub const DATA_MODE: u8 = 0x06;
}

/// Sub-commands for TX_STATUS (0x1C).
pub mod tx_sub {
    pub const PTT: u8 = 0x00;
}

/// Highest memory channel addressable with a single byte.
pub const MEMORY_MAX: u8 = 100;
/// Highest memory bank.
pub const BANK_MAX: u8 = 6;

/// A CI-V command. Arguments are assumed to be range-checked already.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    PowerOn,
    PowerOff,
    /// Memory channel 1–100.
    SelectMemory(u8),
    /// Memory bank 1–6.
    SelectBank(u8),
    /// Key (`true`) or unkey (`false`) the transmitter.
    SetTransmit(bool),
    /// `None` turns data mode off; `Some(filter)` turns it on with that filter.
    SetDataMode(Option<Filter>),
    ReadFrequency,
    SetFrequency(Frequency),
    ReadMode,
    SetMode(OperatingMode, Filter),
    /// Read a meter. The `u8` is the meter sub-command.
    ReadMeter(u8),
    /// RF output power, 0–255.
    SetRfPower(u16),
}

impl Command {
    /// Render this command as an unaddressed frame.
    pub fn to_frame(&self) -> Result<Frame> {
        let frame = match self {
            Command::PowerOn => Frame::new(cmd::POWER, Some(power_sub::ON), vec![]),
            Command::PowerOff => Frame::new(cmd::POWER, Some(power_sub::OFF), vec![]),
            // 1-99 as one BCD byte (12 → 0x12). 100 has no BCD byte and goes out as 0x64.
            Command::SelectMemory(n) => {
                let byte = if *n == MEMORY_MAX { *n } else { bcd::to_bcd(*n)? };
                Frame::new(cmd::MEMORY, None, vec![byte])
            }
            Command::SelectBank(n) => Frame::new(cmd::MEMORY, Some(memory_sub::BANK), vec![*n]),
            Command::SetTransmit(on) => {
                Frame::new(cmd::TX_STATUS, Some(tx_sub::PTT), vec![u8::from(*on)])
            }
            Command::SetDataMode(filter) => {
                let data = match filter {
                    Some(f) => vec![0x01, f.to_civ_byte()],
                    None => vec![0x00, 0x00],
                };
                Frame::new(cmd::SETTINGS, Some(settings_sub::DATA_MODE), data)
            }
            Command::ReadFrequency => Frame::new(cmd::READ_FREQ, None, vec![]),
            Command::SetFrequency(freq) => Frame::new(cmd::SET_FREQ, None, freq.to_bcd()?.to_vec()),
            Command::ReadMode => Frame::new(cmd::READ_MODE, None, vec![]),
            Command::SetMode(mode, filter) => Frame::new(
                cmd::SET_MODE,
                None,
                vec![mode.to_civ_byte(), filter.to_civ_byte()],
            ),
            Command::ReadMeter(sub) => Frame::new(cmd::METER, Some(*sub), vec![]),
            Command::SetRfPower(level) => Frame::new(
                cmd::LEVEL,
                Some(level_sub::RF_POWER),
                bcd::encode_be(u64::from(*level), 2)?,
            ),
        };
        Ok(frame)
    }

    pub fn command_byte(&self) -> u8 {
        match self {
            Command::PowerOn | Command::PowerOff => cmd::POWER,
            Command::SelectMemory(_) | Command::SelectBank(_) => cmd::MEMORY,
            Command::SetTransmit(_) => cmd::TX_STATUS,
            Command::SetDataMode(_) => cmd::SETTINGS,
            Command::ReadFrequency => cmd::READ_FREQ,
            Command::SetFrequency(_) => cmd::SET_FREQ,
            Command::ReadMode => cmd::READ_MODE,
            Command::SetMode(_, _) => cmd::SET_MODE,
            Command::ReadMeter(_) => cmd::METER,
            Command::SetRfPower(_) => cmd::LEVEL,
        }
    }

    /// Whether a data reply to this command leads with a sub-command byte.
    ///
    /// The codec cannot tell; this is the per-command schema that resolves it.
    pub fn has_reply_sub_command(&self) -> bool {
        match self {
            Command::ReadFrequency | Command::ReadMode | Command::SelectMemory(_) => false,
            Command::SetFrequency(_) | Command::SetMode(_, _) => false,
            Command::PowerOn
            | Command::PowerOff
            | Command::SelectBank(_)
            | Command::SetTransmit(_)
            | Command::SetDataMode(_)
            | Command::ReadMeter(_)
            | Command::SetRfPower(_) => true,
        }
    }
}
