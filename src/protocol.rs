//! CI-V frame codec.
//!
//! Wire format: `FE FE <dst> <src> <cmd> [<sub_cmd>] [<data>...] FD`
//!
//! There is no length field. A frame ends at the first `FD`, and nothing in a
//! frame can tell a sub-command byte apart from payload. Inbound frames are
//! decoded with the payload left opaque; splitting it is up to the command
//! that expects the reply (see [`crate::command::Command::has_reply_sub_command`]).

use crate::error::FrameError;

/// CI-V preamble byte. Sent twice at the start of every frame, and on its own
/// as wake-up filler before a power-on command.
pub const PREAMBLE: u8 = 0xFE;
/// End-of-message byte.
pub const EOM: u8 = 0xFD;
/// OK reply command byte.
pub const OK: u8 = 0xFB;
/// NG (rejected) reply command byte.
pub const NG: u8 = 0xFA;

/// Default CI-V address of the IC-7100.
pub const ADDR_IC7100: u8 = 0x88;
/// Default CI-V address of the controller (PC).
pub const ADDR_CONTROLLER: u8 = 0xE0;

/// A command ready to be framed: command number, optional sub-command and payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub command: u8,
    pub sub_command: Option<u8>,
    pub data: Vec<u8>,
}

impl Frame {
    pub fn new(command: u8, sub_command: Option<u8>, data: Vec<u8>) -> Self {
        Self {
            command,
            sub_command,
            data,
        }
    }
}

/// A validated inbound frame.
///
/// `payload` is everything between the command byte and the terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFrame {
    pub dst: u8,
    pub src: u8,
    pub command: u8,
    pub payload: Vec<u8>,
}

impl ParsedFrame {
    pub fn is_ok(&self) -> bool {
        self.command == OK
    }

    pub fn is_ng(&self) -> bool {
        self.command == NG
    }

    /// Rebuild a [`Frame`] once the caller knows whether the payload
    /// starts with a sub-command byte.
    pub fn split(&self, has_sub_command: bool) -> Frame {
        match self.payload.split_first() {
            Some((&sub, rest)) if has_sub_command => Frame::new(self.command, Some(sub), rest.to_vec()),
            _ => Frame::new(self.command, None, self.payload.clone()),
        }
    }
}

/// Serialize `frame` addressed from `src` to `dst`.
pub fn encode(frame: &Frame, dst: u8, src: u8) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(7 + frame.data.len());
    bytes.extend_from_slice(&[PREAMBLE, PREAMBLE, dst, src, frame.command]);
    if let Some(sc) = frame.sub_command {
        bytes.push(sc);
    }
    bytes.extend_from_slice(&frame.data);
    bytes.push(EOM);
    bytes
}

/// Validate a reply sent by the radio at `radio_addr` to `controller_addr`.
///
/// Checks run in wire order: preamble, addressing, terminator. Bytes after
/// the first `FD` are not inspected.
pub fn decode(bytes: &[u8], radio_addr: u8, controller_addr: u8) -> Result<ParsedFrame, FrameError> {
    if !bytes.starts_with(&[PREAMBLE, PREAMBLE]) {
        // A lone FE (or nothing) may still become a frame.
        return if bytes.iter().all(|&b| b == PREAMBLE) {
            Err(FrameError::Truncated)
        } else {
            Err(FrameError::BadPreamble)
        };
    }

    let (dst, src) = match bytes.get(2..4) {
        Some(&[dst, src]) => (dst, src),
        _ => return Err(FrameError::Truncated),
    };
    if dst != controller_addr || src != radio_addr {
        return Err(FrameError::BadAddressing { dst, src });
    }

    let eom = bytes[4..]
        .iter()
        .position(|&b| b == EOM)
        .map(|pos| pos + 4)
        .ok_or(FrameError::Truncated)?;
    // FE FE dst src FD: terminator where the command byte belongs.
    if eom == 4 {
        return Err(FrameError::Truncated);
    }

    Ok(ParsedFrame {
        dst,
        src,
        command: bytes[4],
        payload: bytes[5..eom].to_vec(),
    })
}
