//! Scripted transport for dispatcher tests.
//!
//! Each `write_all` releases the next queued reply onto the "line", where
//! `read_byte` hands it out one byte at a time. An empty line reads as a
//! timeout. Clones share state, so a test can keep a handle after moving the
//! transport into a `Radio`.

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::Transport;

#[derive(Debug)]
enum Reply {
    Bytes(Vec<u8>),
    ReadError(io::ErrorKind),
}

#[derive(Debug, Default)]
struct Inner {
    replies: VecDeque<Reply>,
    line: VecDeque<u8>,
    read_error: Option<io::ErrorKind>,
    fail_writes: bool,
    written: Vec<Vec<u8>>,
    bytes_read: usize,
    cancel_after: Option<(usize, CancellationToken)>,
}

#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<Inner>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap()
    }

    /// Queue the bytes the radio sends after the next unanswered write.
    /// An empty slice is a silent radio.
    pub fn reply(&self, bytes: &[u8]) -> &Self {
        self.lock().replies.push_back(Reply::Bytes(bytes.to_vec()));
        self
    }

    /// Make the read after the next unanswered write fail.
    pub fn reply_error(&self, kind: io::ErrorKind) -> &Self {
        self.lock().replies.push_back(Reply::ReadError(kind));
        self
    }

    pub fn fail_writes(&self) {
        self.lock().fail_writes = true;
    }

    /// Cancel `token` once `n` bytes have been read.
    pub fn cancel_after(&self, n: usize, token: CancellationToken) {
        self.lock().cancel_after = Some((n, token));
    }

    /// Every successful `write_all`, in order.
    pub fn written(&self) -> Vec<Vec<u8>> {
        self.lock().written.clone()
    }

    /// Bytes still waiting on the line.
    pub fn unread(&self) -> usize {
        self.lock().line.len()
    }
}

impl Transport for MockTransport {
    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        let mut inner = self.lock();
        if inner.fail_writes {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "mock write failure"));
        }
        inner.written.push(buf.to_vec());
        match inner.replies.pop_front() {
            Some(Reply::Bytes(bytes)) => inner.line.extend(bytes),
            Some(Reply::ReadError(kind)) => inner.read_error = Some(kind),
            None => {}
        }
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn read_byte(&mut self, _timeout: Duration) -> io::Result<Option<u8>> {
        let mut inner = self.lock();
        if let Some(kind) = inner.read_error.take() {
            return Err(io::Error::new(kind, "mock read failure"));
        }
        let byte = inner.line.pop_front();
        if byte.is_some() {
            inner.bytes_read += 1;
            if let Some((n, token)) = &inner.cancel_after
                && inner.bytes_read >= *n
            {
                token.cancel();
            }
        }
        Ok(byte)
    }
}
