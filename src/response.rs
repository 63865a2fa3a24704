use log::warn;

use crate::bcd;
use crate::command::{Command, cmd};
use crate::error::{CivError, Result};
use crate::frequency::Frequency;
use crate::mode::{Filter, OperatingMode};
use crate::protocol::{Frame, ParsedFrame};

/// A typed reply, shaped by the command that asked for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Command accepted (FB).
    Ok,
    /// Command rejected (FA).
    Ng,
    Frequency(Frequency),
    Mode(OperatingMode, Filter),
    /// (sub_command, value 0–255)
    Meter(u8, u16),
}

/// Outcome of a set-style command whose write went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ack {
    /// The radio answered FB.
    Ok,
    /// Nothing came back. Some commands (power on in particular) are never answered.
    Silent,
}

/// Interpret `parsed` as the reply to `command`.
pub fn parse_response(parsed: &ParsedFrame, command: &Command) -> Result<Response> {
    if parsed.is_ok() {
        return Ok(Response::Ok);
    }
    if parsed.is_ng() {
        return Ok(Response::Ng);
    }

    let frame = parsed.split(command.has_reply_sub_command());
    match command {
        Command::ReadFrequency => parse_frequency(&frame),
        Command::ReadMode => parse_mode(&frame),
        Command::ReadMeter(sub) => parse_meter(&frame, *sub),
        // Set-style commands only ever get FB/FA.
        other => {
            warn!("unexpected reply to {:?}: {:?}", other, frame);
            Err(unexpected(command.command_byte()))
        }
    }
}

fn unexpected(command: u8) -> CivError {
    CivError::UnexpectedResponse { command }
}

/// `03 <5 bytes LE BCD>`
fn parse_frequency(frame: &Frame) -> Result<Response> {
    if frame.command != cmd::READ_FREQ {
        return Err(unexpected(cmd::READ_FREQ));
    }
    let bytes: [u8; 5] = frame
        .data
        .as_slice()
        .try_into()
        .map_err(|_| unexpected(cmd::READ_FREQ))?;
    Ok(Response::Frequency(Frequency::from_bcd(bytes)?))
}

/// `04 <mode> [<filter>]`. Without a filter byte the radio is on FIL1.
fn parse_mode(frame: &Frame) -> Result<Response> {
    if frame.command != cmd::READ_MODE {
        return Err(unexpected(cmd::READ_MODE));
    }
    let filter = match frame.data.get(1..) {
        Some([]) => Filter::Fil1,
        Some([f]) => Filter::from_civ_byte(*f)?,
        _ => return Err(unexpected(cmd::READ_MODE)),
    };
    Ok(Response::Mode(OperatingMode::from_civ_byte(frame.data[0])?, filter))
}

/// `15 <sub> <2 bytes BE BCD>`
fn parse_meter(frame: &Frame, expected_sub: u8) -> Result<Response> {
    if frame.command != cmd::METER
        || frame.sub_command != Some(expected_sub)
        || frame.data.len() != 2
    {
        return Err(unexpected(cmd::METER));
    }
    let value = bcd::decode_be(&frame.data)? as u16;
    Ok(Response::Meter(expected_sub, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::meter_sub;
    use crate::protocol::{ADDR_CONTROLLER, ADDR_IC7100, NG, OK};

    fn reply(command: u8, payload: Vec<u8>) -> ParsedFrame {
        ParsedFrame {
            dst: ADDR_CONTROLLER,
            src: ADDR_IC7100,
            command,
            payload,
        }
    }

    #[test]
    fn test_ok_and_ng_apply_to_any_command() {
        let ok = reply(OK, vec![]);
        let ng = reply(NG, vec![]);
        assert_eq!(parse_response(&ok, &Command::PowerOff).unwrap(), Response::Ok);
        assert_eq!(parse_response(&ok, &Command::ReadFrequency).unwrap(), Response::Ok);
        assert_eq!(parse_response(&ng, &Command::SelectBank(2)).unwrap(), Response::Ng);
    }

    #[test]
    fn test_frequency_reply() {
        let parsed = reply(cmd::READ_FREQ, vec![0x00, 0x00, 0x96, 0x46, 0x01]);
        assert_eq!(
            parse_response(&parsed, &Command::ReadFrequency).unwrap(),
            Response::Frequency(Frequency::from_hz(146_960_000).unwrap())
        );
    }

    #[test]
    fn test_frequency_reply_wrong_length() {
        let parsed = reply(cmd::READ_FREQ, vec![0x00, 0x96, 0x46, 0x01]);
        assert!(matches!(
            parse_response(&parsed, &Command::ReadFrequency),
            Err(CivError::UnexpectedResponse { command: 0x03 })
        ));
    }

    #[test]
    fn test_frequency_reply_bad_bcd() {
        let parsed = reply(cmd::READ_FREQ, vec![0x00, 0x00, 0x9A, 0x46, 0x01]);
        assert!(matches!(
            parse_response(&parsed, &Command::ReadFrequency),
            Err(CivError::InvalidBcd(0x9A))
        ));
    }

    #[test]
    fn test_mode_reply() {
        let parsed = reply(cmd::READ_MODE, vec![0x05, 0x02]);
        assert_eq!(
            parse_response(&parsed, &Command::ReadMode).unwrap(),
            Response::Mode(OperatingMode::Fm, Filter::Fil2)
        );
    }

    #[test]
    fn test_mode_reply_without_filter() {
        let parsed = reply(cmd::READ_MODE, vec![0x01]);
        assert_eq!(
            parse_response(&parsed, &Command::ReadMode).unwrap(),
            Response::Mode(OperatingMode::Usb, Filter::Fil1)
        );
    }

    #[test]
    fn test_meter_reply() {
        let parsed = reply(cmd::METER, vec![meter_sub::SWR, 0x00, 0x48]);
        assert_eq!(
            parse_response(&parsed, &Command::ReadMeter(meter_sub::SWR)).unwrap(),
            Response::Meter(meter_sub::SWR, 48)
        );
    }

    #[test]
    fn test_meter_reply_wrong_sub() {
        let parsed = reply(cmd::METER, vec![meter_sub::S_METER, 0x00, 0x48]);
        assert!(parse_response(&parsed, &Command::ReadMeter(meter_sub::SWR)).is_err());
    }

    #[test]
    fn test_data_reply_to_set_command() {
        let parsed = reply(cmd::TX_STATUS, vec![0x00, 0x01]);
        assert!(matches!(
            parse_response(&parsed, &Command::SetTransmit(true)),
            Err(CivError::UnexpectedResponse { command: 0x1C })
        ));
    }
}
