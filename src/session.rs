//! Sharing one radio between several callers.
//!
//! A [`Radio`] already refuses overlapping commands by taking `&mut self`.
//! `SharedRadio` carries that across threads: a caller either waits for the
//! channel ([`SharedRadio::with`]) or is told it is busy ([`SharedRadio::try_with`]).

use std::sync::{Arc, Mutex, PoisonError, TryLockError};

use log::debug;

use crate::error::{CivError, Result};
use crate::radio::Radio;
use crate::state::RadioState;
use crate::transport::Transport;

pub struct SharedRadio<T: Transport> {
    inner: Arc<Mutex<Radio<T>>>,
}

impl<T: Transport> Clone for SharedRadio<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Transport> SharedRadio<T> {
    pub fn new(radio: Radio<T>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(radio)),
        }
    }

    /// Run `f` with exclusive use of the radio, waiting for any command in flight.
    pub fn with<R>(&self, f: impl FnOnce(&mut Radio<T>) -> Result<R>) -> Result<R> {
        // A panicking caller leaves the radio usable; stale bytes are drained
        // by the next exchange.
        let mut radio = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut radio)
    }

    /// Like [`with`](Self::with), but fails with [`CivError::Busy`] instead of waiting.
    pub fn try_with<R>(&self, f: impl FnOnce(&mut Radio<T>) -> Result<R>) -> Result<R> {
        let mut radio = match self.inner.try_lock() {
            Ok(radio) => radio,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => {
                debug!("radio busy");
                return Err(CivError::Busy);
            }
        };
        f(&mut radio)
    }

    pub fn snapshot(&self) -> RadioState {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .snapshot()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::radio::RadioConfig;
    use crate::response::Ack;
    use crate::transport::mock::MockTransport;

    const OK_REPLY: [u8; 6] = [0xFE, 0xFE, 0xE0, 0x88, 0xFB, 0xFD];

    fn shared() -> (SharedRadio<MockTransport>, MockTransport) {
        let mock = MockTransport::new();
        let radio = Radio::new(mock.clone(), RadioConfig::default());
        (SharedRadio::new(radio), mock)
    }

    #[test]
    fn test_try_with_while_in_flight_is_busy() {
        let (radio, mock) = shared();
        mock.reply(&OK_REPLY);

        let other = radio.clone();
        let ack = radio
            .with(|r| {
                assert!(matches!(
                    other.try_with(|r| r.set_transmit()),
                    Err(CivError::Busy)
                ));
                r.goto_memory(10)
            })
            .unwrap();

        assert_eq!(ack, Ack::Ok);
        assert_eq!(mock.written().len(), 1);
        assert_eq!(radio.snapshot().memory_num, 10);
        assert!(!radio.snapshot().transmitting);
    }

    #[test]
    fn test_threads_do_not_interleave() {
        let (radio, mock) = shared();
        for _ in 0..20 {
            mock.reply(&OK_REPLY);
        }

        let handles: Vec<_> = (1..=4u8)
            .map(|bank| {
                let radio = radio.clone();
                thread::spawn(move || {
                    for _ in 0..5 {
                        radio.with(|r| r.select_bank(bank)).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let written = mock.written();
        assert_eq!(written.len(), 20);
        for frame in written {
            assert_eq!(frame.len(), 8);
            assert_eq!(frame[..6], [0xFE, 0xFE, 0x88, 0xE0, 0x08, 0xA0]);
            assert_eq!(frame[7], 0xFD);
        }
        assert_eq!(mock.unread(), 0);
    }
}
