use std::io;
use std::time::Duration;

#[cfg(test)]
pub mod mock;
#[cfg(feature = "serial")]
pub mod serial;

/// A duplex byte channel to the radio.
///
/// Reads are one byte at a time with a timeout; a quiet line is `Ok(None)`,
/// not an error. Closing is dropping.
pub trait Transport: Send {
    /// Write all bytes to the channel.
    fn write_all(&mut self, buf: &[u8]) -> io::Result<()>;

    /// Flush any buffered output.
    fn flush(&mut self) -> io::Result<()>;

    /// Wait up to `timeout` for the next byte.
    fn read_byte(&mut self, timeout: Duration) -> io::Result<Option<u8>>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        (**self).write_all(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }

    fn read_byte(&mut self, timeout: Duration) -> io::Result<Option<u8>> {
        (**self).read_byte(timeout)
    }
}
