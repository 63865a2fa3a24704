//! Operator console commands.
//!
//! ```text
//! t          transmit until Enter
//! m<N>       memory channel N (1-100)
//! b<N>       memory bank N (1-6)
//! d          toggle data mode
//! on / off   power
//! f <MHz>    set frequency
//! s          show state
//! q          quit
//! ```

use crate::command::{BANK_MAX, MEMORY_MAX};
use crate::error::{CivError, Result};
use crate::frequency::Frequency;

#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Transmit,
    Memory(u8),
    Bank(u8),
    ToggleDataMode,
    PowerOn,
    PowerOff,
    Frequency(Frequency),
    Status,
    Quit,
}

pub const HELP: &str = "t=transmit  m<N>=memory  b<N>=bank  d=data mode  on/off  f <MHz>  s=status  q=quit";

/// Parse one console line. Blank lines are `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<Input>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let input = match line {
        "q" | "quit" => Input::Quit,
        "t" => Input::Transmit,
        "d" => Input::ToggleDataMode,
        "on" => Input::PowerOn,
        "off" => Input::PowerOff,
        "s" => Input::Status,
        _ => {
            if let Some(rest) = line.strip_prefix('f') {
                let mhz = rest
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| invalid(line))?;
                Input::Frequency(Frequency::from_mhz(mhz)?)
            } else if let Some(rest) = line.strip_prefix('m') {
                Input::Memory(parse_index(rest, MEMORY_MAX, line)?)
            } else if let Some(rest) = line.strip_prefix('b') {
                Input::Bank(parse_index(rest, BANK_MAX, line)?)
            } else {
                return Err(invalid(line));
            }
        }
    };
    Ok(Some(input))
}

fn parse_index(digits: &str, max: u8, line: &str) -> Result<u8> {
    let n = digits.trim().parse::<u8>().map_err(|_| invalid(line))?;
    if !(1..=max).contains(&n) {
        return Err(CivError::InvalidArgument(format!("{line}: expected 1-{max}")));
    }
    Ok(n)
}

fn invalid(line: &str) -> CivError {
    CivError::InvalidArgument(format!("unrecognised command {line:?}"))
}
