use thiserror::Error;

pub type Result<T> = std::result::Result<T, CivError>;

/// Reasons a reply read off the wire is not a usable CI-V frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("frame does not start with FE FE")]
    BadPreamble,

    #[error("unexpected addressing: dst {dst:#04x}, src {src:#04x}")]
    BadAddressing { dst: u8, src: u8 },

    #[error("frame truncated (no FD terminator)")]
    Truncated,
}

#[derive(Debug, Error)]
pub enum CivError {
    #[cfg(feature = "serial")]
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[cfg(feature = "serial")]
    #[error("could not open {port}: {source}")]
    Connect {
        port: String,
        #[source]
        source: serialport::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("IC-7100 serial port not found")]
    PortNotFound,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("malformed reply: {0}")]
    Frame(#[from] FrameError),

    #[error("radio returned NG (command rejected)")]
    Ng,

    #[error("no reply from radio")]
    NoResponse,

    #[error("unexpected reply to command {command:#04x}")]
    UnexpectedResponse { command: u8 },

    #[error("timeout waiting for response")]
    Timeout,

    #[error("another command is already in flight")]
    Busy,

    #[error("operation cancelled")]
    Cancelled,

    #[error("invalid BCD data: {0:#04x}")]
    InvalidBcd(u8),

    #[error("frequency out of range: {0} Hz")]
    FrequencyOutOfRange(u64),

    #[error("unknown operating mode: {0:#04x}")]
    UnknownMode(u8),

    #[error("no power-on preamble length known for {0} baud")]
    UnsupportedBaud(u32),
}
