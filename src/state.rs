use crate::frequency::Frequency;
use crate::mode::OperatingMode;

/// Last-known settings of the radio.
///
/// This is a mirror, not a source of truth: fields change only after the
/// dispatcher sees a command go through, and reads refresh them. The
/// dispatcher owns the only mutable copy; callers get `&RadioState` or a clone.
#[derive(Debug, Clone, PartialEq)]
pub struct RadioState {
    pub frequency: Frequency,
    pub mode: OperatingMode,
    /// Memory channel, 1–100.
    pub memory_num: u8,
    /// Memory bank, 1–6.
    pub memory_bank: u8,
    pub transmitting: bool,
    /// RF power as a fraction of full scale (0.0–1.0).
    pub power_frac: f32,
    pub data_mode: bool,
    /// Raw SWR meter reading (0–255).
    pub swr_meter: u16,
    /// Raw S-meter reading (0–255).
    pub signal_meter: u16,
    pub external_speaker_active: bool,
    /// LCD backlight as a fraction (0.0–1.0).
    pub backlight_frac: f32,
}

impl Default for RadioState {
    fn default() -> Self {
        Self {
            frequency: Frequency(146_960_000),
            mode: OperatingMode::Fm,
            memory_num: 1,
            memory_bank: 1,
            transmitting: false,
            power_frac: 0.05,
            data_mode: true,
            swr_meter: 0,
            signal_meter: 0,
            external_speaker_active: true,
            backlight_frac: 0.3,
        }
    }
}
