use std::thread;
use std::time::Duration;

use log::{debug, info, trace, warn};
use tokio_util::sync::CancellationToken;

use crate::command::{BANK_MAX, Command, MEMORY_MAX, meter_sub};
use crate::error::{CivError, Result};
use crate::frequency::Frequency;
use crate::mode::{Filter, OperatingMode};
use crate::protocol::{self, ADDR_CONTROLLER, ADDR_IC7100, EOM, PREAMBLE, ParsedFrame};
use crate::response::{self, Ack, Response};
use crate::state::RadioState;
use crate::transport::Transport;

#[cfg(feature = "serial")]
use crate::transport::serial::{self, SerialTransport};

/// Number of standalone `FE` bytes the IC-7100 needs to wake its UART
/// before it will sample a power-on frame, by baud rate.
const WAKE_PREAMBLE: &[(u32, usize)] = &[(300, 2), (1200, 3), (4800, 7), (9600, 13), (19200, 25)];

/// Wake-up preamble length for `baud`, if the radio supports that rate.
pub fn wake_preamble_len(baud: u32) -> Option<usize> {
    WAKE_PREAMBLE
        .iter()
        .find(|&&(rate, _)| rate == baud)
        .map(|&(_, count)| count)
}

/// Configuration for the radio connection.
#[derive(Debug, Clone)]
pub struct RadioConfig {
    /// CI-V address of the radio.
    pub radio_addr: u8,
    /// CI-V address of the controller (this PC).
    pub controller_addr: u8,
    /// Serial baud rate. Also selects the power-on preamble length.
    pub baud_rate: u32,
    /// How long to wait for each reply byte.
    pub read_timeout: Duration,
    /// Upper bound on byte reads per reply, so a line that never sends FD
    /// cannot keep the read loop spinning.
    pub max_read_attempts: usize,
    /// Whether the radio echoes our frames back before replying (USB echo-back).
    pub echo_back: bool,
    /// How often `transmit_until` checks its stop signal.
    pub hold_poll_interval: Duration,
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            radio_addr: ADDR_IC7100,
            controller_addr: ADDR_CONTROLLER,
            baud_rate: 9600,
            read_timeout: Duration::from_millis(100),
            max_read_attempts: 500,
            echo_back: false,
            hold_poll_interval: Duration::from_millis(50),
        }
    }
}

/// Which way bytes passed the observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Tx,
    Rx,
}

/// Callback that sees every byte sequence written to or read from the radio.
pub type Observer = Box<dyn FnMut(Direction, &[u8]) + Send>;

/// Command dispatcher for one IC-7100 on one channel.
///
/// Every operation takes `&mut self`, so one `Radio` never has two commands
/// in flight. Share it through [`crate::session::SharedRadio`] when several
/// callers need it.
pub struct Radio<T: Transport> {
    transport: T,
    config: RadioConfig,
    state: RadioState,
    observer: Option<Observer>,
    /// Set when a reply was abandoned; the line is drained before the next write.
    stale: bool,
}

#[cfg(feature = "serial")]
impl Radio<SerialTransport> {
    /// Open `port_name` and wrap it in a `Radio`.
    pub fn connect(port_name: &str, config: RadioConfig) -> Result<Self> {
        let transport = serial::open_port(port_name, config.baud_rate)?;
        Ok(Self::new(transport, config))
    }

    /// Find the IC-7100 by its USB product string and connect.
    pub fn auto_connect(config: RadioConfig) -> Result<Self> {
        let port_name = serial::find_ic7100_port()?;
        Self::connect(&port_name, config)
    }
}

impl<T: Transport> Radio<T> {
    pub fn new(transport: T, config: RadioConfig) -> Self {
        Self {
            transport,
            config,
            state: RadioState::default(),
            observer: None,
            stale: false,
        }
    }

    /// Last-known radio settings.
    pub fn state(&self) -> &RadioState {
        &self.state
    }

    pub fn snapshot(&self) -> RadioState {
        self.state.clone()
    }

    pub fn set_observer(&mut self, observer: Observer) {
        self.observer = Some(observer);
    }

    // --- Operations ---

    /// Wake the radio and switch it on.
    ///
    /// A sleeping radio usually says nothing, so silence and unparseable
    /// replies both count as success. Only an explicit NG or a transport
    /// failure is an error.
    pub fn power_on(&mut self) -> Result<Ack> {
        let baud = self.config.baud_rate;
        let count = wake_preamble_len(baud).ok_or(CivError::UnsupportedBaud(baud))?;

        let frame = Command::PowerOn.to_frame()?;
        let mut bytes = vec![PREAMBLE; count];
        bytes.extend(protocol::encode(
            &frame,
            self.config.radio_addr,
            self.config.controller_addr,
        ));

        info!("power on ({count} wake-up bytes at {baud} baud)");
        self.write(&bytes)?;

        match self.read_reply(&bytes, None) {
            Ok(Some(parsed)) if parsed.is_ok() => Ok(Ack::Ok),
            Ok(Some(parsed)) if parsed.is_ng() => Err(CivError::Ng),
            Ok(_) => Ok(Ack::Silent),
            Err(CivError::Io(e)) => Err(CivError::Io(e)),
            Err(e) => {
                debug!("ignoring reply to power on: {e}");
                Ok(Ack::Silent)
            }
        }
    }

    pub fn power_off(&mut self) -> Result<Ack> {
        info!("power off");
        self.send_set(&Command::PowerOff, None)
    }

    /// Switch to memory channel `n` (1–100).
    pub fn goto_memory(&mut self, n: u8) -> Result<Ack> {
        if !(1..=MEMORY_MAX).contains(&n) {
            return Err(CivError::InvalidArgument(format!(
                "memory channel {n} (expected 1-{MEMORY_MAX})"
            )));
        }
        let ack = self.send_set(&Command::SelectMemory(n), None)?;
        self.state.memory_num = n;
        Ok(ack)
    }

    /// Switch to memory bank `n` (1–6).
    pub fn select_bank(&mut self, n: u8) -> Result<Ack> {
        if !(1..=BANK_MAX).contains(&n) {
            return Err(CivError::InvalidArgument(format!(
                "memory bank {n} (expected 1-{BANK_MAX})"
            )));
        }
        let ack = self.send_set(&Command::SelectBank(n), None)?;
        self.state.memory_bank = n;
        Ok(ack)
    }

    pub fn set_receive(&mut self) -> Result<Ack> {
        self.key(false, None)
    }

    pub fn set_transmit(&mut self) -> Result<Ack> {
        self.key(true, None)
    }

    /// Key up, hold until `stop` fires, then key down.
    ///
    /// `stop` also aborts the wait for the key-up reply. Whenever the key-up
    /// frame may have reached the radio, an unkey frame follows it, even if
    /// the key-up reply was lost or garbled. That reply error is returned.
    pub fn transmit_until(&mut self, stop: &CancellationToken) -> Result<Ack> {
        match self.key(true, Some(stop)) {
            Ok(_) => info!("transmitting"),
            Err(CivError::Cancelled) => debug!("key-up reply abandoned"),
            Err(e @ (CivError::Ng | CivError::InvalidArgument(_))) => return Err(e),
            Err(e) => {
                warn!("key-up failed ({e}), unkeying");
                if let Err(unkey) = self.set_receive() {
                    warn!("unkey after failed key-up: {unkey}");
                }
                return Err(e);
            }
        }

        while !stop.is_cancelled() {
            thread::sleep(self.config.hold_poll_interval);
        }

        info!("end of transmission");
        self.set_receive()
    }

    /// Turn data mode on (FIL2) or off.
    pub fn set_data_mode(&mut self, on: bool) -> Result<Ack> {
        let filter = on.then_some(Filter::Fil2);
        let ack = self.send_set(&Command::SetDataMode(filter), None)?;
        self.state.data_mode = on;
        Ok(ack)
    }

    pub fn read_frequency(&mut self) -> Result<Frequency> {
        match self.send_read(&Command::ReadFrequency)? {
            Response::Frequency(f) => {
                self.state.frequency = f;
                Ok(f)
            }
            other => Err(unexpected(&Command::ReadFrequency, &other)),
        }
    }

    pub fn set_frequency(&mut self, freq: Frequency) -> Result<Ack> {
        let ack = self.send_set(&Command::SetFrequency(freq), None)?;
        self.state.frequency = freq;
        Ok(ack)
    }

    pub fn read_mode(&mut self) -> Result<(OperatingMode, Filter)> {
        match self.send_read(&Command::ReadMode)? {
            Response::Mode(mode, filter) => {
                self.state.mode = mode;
                Ok((mode, filter))
            }
            other => Err(unexpected(&Command::ReadMode, &other)),
        }
    }

    pub fn set_mode(&mut self, mode: OperatingMode, filter: Filter) -> Result<Ack> {
        let ack = self.send_set(&Command::SetMode(mode, filter), None)?;
        self.state.mode = mode;
        Ok(ack)
    }

    /// Read the S-meter (0–255).
    pub fn read_s_meter(&mut self) -> Result<u16> {
        let value = self.read_meter(meter_sub::S_METER)?;
        self.state.signal_meter = value;
        Ok(value)
    }

    /// Read the SWR meter (0–255).
    pub fn read_swr_meter(&mut self) -> Result<u16> {
        let value = self.read_meter(meter_sub::SWR)?;
        self.state.swr_meter = value;
        Ok(value)
    }

    /// Set RF output power as a fraction of full scale.
    pub fn set_rf_power(&mut self, frac: f32) -> Result<Ack> {
        if !(0.0..=1.0).contains(&frac) {
            return Err(CivError::InvalidArgument(format!(
                "RF power {frac} (expected 0.0-1.0)"
            )));
        }
        let level = (frac * 255.0).round() as u16;
        let ack = self.send_set(&Command::SetRfPower(level), None)?;
        self.state.power_frac = frac;
        Ok(ack)
    }

    // --- Exchange ---

    fn key(&mut self, transmit: bool, cancel: Option<&CancellationToken>) -> Result<Ack> {
        let ack = self.send_set(&Command::SetTransmit(transmit), cancel)?;
        self.state.transmitting = transmit;
        Ok(ack)
    }

    fn read_meter(&mut self, sub: u8) -> Result<u16> {
        let command = Command::ReadMeter(sub);
        match self.send_read(&command)? {
            Response::Meter(_, value) => Ok(value),
            other => Err(unexpected(&command, &other)),
        }
    }

    fn send_set(&mut self, command: &Command, cancel: Option<&CancellationToken>) -> Result<Ack> {
        match self.exchange(command, cancel)? {
            None => Ok(Ack::Silent),
            Some(Response::Ok) => Ok(Ack::Ok),
            Some(Response::Ng) => Err(CivError::Ng),
            Some(other) => Err(unexpected(command, &other)),
        }
    }

    fn send_read(&mut self, command: &Command) -> Result<Response> {
        match self.exchange(command, None)? {
            None => Err(CivError::NoResponse),
            Some(Response::Ng) => Err(CivError::Ng),
            Some(response) => Ok(response),
        }
    }

    fn exchange(
        &mut self,
        command: &Command,
        cancel: Option<&CancellationToken>,
    ) -> Result<Option<Response>> {
        let frame = command.to_frame()?;
        let bytes = protocol::encode(&frame, self.config.radio_addr, self.config.controller_addr);

        self.write(&bytes)?;
        match self.read_reply(&bytes, cancel)? {
            Some(parsed) => response::parse_response(&parsed, command).map(Some),
            None => {
                debug!("no reply to {:?}", command);
                Ok(None)
            }
        }
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.resync()?;

        trace!("TX: {:02X?}", bytes);
        self.notify(Direction::Tx, bytes);
        self.transport.write_all(bytes)?;
        self.transport.flush()?;
        Ok(())
    }

    /// Read one reply, skipping the echo of `sent` when echo-back is on.
    fn read_reply(
        &mut self,
        sent: &[u8],
        cancel: Option<&CancellationToken>,
    ) -> Result<Option<ParsedFrame>> {
        let mut raw = self.read_raw(cancel)?;
        if self.config.echo_back && raw == sent {
            trace!("echo: {:02X?}", raw);
            raw = self.read_raw(cancel)?;
        }

        if raw.is_empty() {
            return Ok(None);
        }

        let parsed = protocol::decode(&raw, self.config.radio_addr, self.config.controller_addr)
            .inspect_err(|e| warn!("bad reply {:02X?}: {}", raw, e))?;
        Ok(Some(parsed))
    }

    /// Read bytes up to and including FD, or until the line goes quiet.
    fn read_raw(&mut self, cancel: Option<&CancellationToken>) -> Result<Vec<u8>> {
        let mut buf = Vec::new();

        for _ in 0..self.config.max_read_attempts {
            if cancel.is_some_and(CancellationToken::is_cancelled) {
                self.stale = true;
                return Err(CivError::Cancelled);
            }

            let byte = match self.transport.read_byte(self.config.read_timeout) {
                Ok(byte) => byte,
                Err(e) => {
                    self.stale = true;
                    return Err(CivError::Io(e));
                }
            };

            match byte {
                Some(b) => {
                    buf.push(b);
                    if b == EOM {
                        break;
                    }
                }
                None => {
                    if !buf.is_empty() {
                        // The rest of this frame may still turn up.
                        self.stale = true;
                    }
                    break;
                }
            }
        }

        if !buf.is_empty() {
            trace!("RX: {:02X?}", buf);
            self.notify(Direction::Rx, &buf);
        }

        if buf.len() >= self.config.max_read_attempts && buf.last() != Some(&EOM) {
            warn!("no FD after {} bytes", buf.len());
            self.stale = true;
            return Err(CivError::Timeout);
        }
        Ok(buf)
    }

    /// Drain leftovers of an abandoned reply until the line is quiet.
    fn resync(&mut self) -> Result<()> {
        if !self.stale {
            return Ok(());
        }

        let mut dropped = 0usize;
        for _ in 0..self.config.max_read_attempts {
            match self.transport.read_byte(self.config.read_timeout)? {
                Some(_) => dropped += 1,
                None => {
                    debug!("discarded {dropped} stale byte(s)");
                    self.stale = false;
                    return Ok(());
                }
            }
        }

        warn!("line still busy after discarding {dropped} byte(s)");
        Err(CivError::Timeout)
    }

    fn notify(&mut self, direction: Direction, bytes: &[u8]) {
        if let Some(observer) = self.observer.as_mut() {
            observer(direction, bytes);
        }
    }
}

fn unexpected(command: &Command, response: &Response) -> CivError {
    warn!("unexpected response to {:?}: {:?}", command, response);
    CivError::UnexpectedResponse {
        command: command.command_byte(),
    }
}
