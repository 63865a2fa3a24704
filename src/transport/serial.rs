use std::io;
use std::time::Duration;

use log::{debug, info, warn};
use serialport::SerialPortType;

use crate::error::{CivError, Result};

use super::Transport;

/// USB product string to match for the IC-7100.
const IC7100_PRODUCT: &str = "IC-7100";

/// CI-V line settings (8N1).
const DATA_BITS: serialport::DataBits = serialport::DataBits::Eight;
const STOP_BITS: serialport::StopBits = serialport::StopBits::One;
const PARITY: serialport::Parity = serialport::Parity::None;

/// A CI-V transport backed by a native serial port.
pub struct SerialTransport {
    port: Box<dyn serialport::SerialPort>,
    /// Last timeout pushed to the driver, so it is only reset when it changes.
    timeout: Option<Duration>,
}

impl SerialTransport {
    pub fn new(port: Box<dyn serialport::SerialPort>) -> Self {
        Self {
            port,
            timeout: None,
        }
    }
}

impl Transport for SerialTransport {
    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        io::Write::write_all(&mut self.port, buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        io::Write::flush(&mut self.port)
    }

    fn read_byte(&mut self, timeout: Duration) -> io::Result<Option<u8>> {
        if self.timeout != Some(timeout) {
            self.port.set_timeout(timeout).map_err(io::Error::other)?;
            self.timeout = Some(timeout);
        }

        let mut byte = [0u8; 1];
        match io::Read::read(&mut self.port, &mut byte) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(byte[0])),
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Find the serial port of an IC-7100 by its USB product string.
pub fn find_ic7100_port() -> Result<String> {
    let ports = serialport::available_ports().map_err(CivError::Serial)?;

    for port in &ports {
        debug!("found port: {} ({:?})", port.port_name, port.port_type);
        if let SerialPortType::UsbPort(usb_info) = &port.port_type
            && let Some(product) = &usb_info.product
            && product.contains(IC7100_PRODUCT)
        {
            info!("found IC-7100 on {}", port.port_name);
            return Ok(port.port_name.clone());
        }
    }

    if ports.is_empty() {
        warn!("no serial ports found");
    } else {
        warn!("IC-7100 not found among {} port(s):", ports.len());
        for port in &ports {
            warn!("  {} ({:?})", port.port_name, port.port_type);
        }
    }

    Err(CivError::PortNotFound)
}

/// Open `port_name` at `baud_rate` with CI-V line settings.
///
/// Anything already sitting in the input buffer is discarded.
pub fn open_port(port_name: &str, baud_rate: u32) -> Result<SerialTransport> {
    let port = serialport::new(port_name, baud_rate)
        .data_bits(DATA_BITS)
        .stop_bits(STOP_BITS)
        .parity(PARITY)
        .timeout(Duration::from_millis(100))
        .open()
        .map_err(|source| CivError::Connect {
            port: port_name.to_string(),
            source,
        })?;

    if let Err(e) = port.clear(serialport::ClearBuffer::Input) {
        debug!("could not clear input on {}: {}", port_name, e);
    }

    info!("opened {} at {} baud", port_name, baud_rate);
    Ok(SerialTransport::new(port))
}
