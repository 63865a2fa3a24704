use tokio_util::sync::CancellationToken;

use crate::frequency::Frequency;
use crate::state::RadioState;

/// Commands sent from the console to the radio task.
#[derive(Debug)]
pub enum RadioCommand {
    PowerOn,
    PowerOff,
    GotoMemory(u8),
    SelectBank(u8),
    SetDataMode(bool),
    SetFrequency(Frequency),
    /// Key up until the token is cancelled.
    Transmit(CancellationToken),
    /// Refresh frequency, mode and meters.
    Poll,
    Quit,
}

/// Events sent from the radio task to the console.
#[derive(Debug)]
pub enum RadioEvent {
    StateUpdate(RadioState),
    /// State right after a `Poll` refresh.
    Polled(RadioState),
    Info(String),
    Error(String),
    Disconnected,
}
