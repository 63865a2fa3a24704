use std::sync::mpsc as std_mpsc;

use log::debug;
use tokio::sync::mpsc as tokio_mpsc;

use crate::radio::Radio;
use crate::transport::Transport;

use super::message::{RadioCommand, RadioEvent};

/// Run the radio command loop on a blocking thread.
///
/// Executes commands from `cmd_rx` one at a time and reports the new state
/// after each via `event_tx`. Returns when told to quit or when either
/// channel closes.
pub fn radio_loop<T: Transport>(
    mut radio: Radio<T>,
    cmd_rx: std_mpsc::Receiver<RadioCommand>,
    event_tx: tokio_mpsc::UnboundedSender<RadioEvent>,
) {
    while let Ok(cmd) = cmd_rx.recv() {
        if let RadioCommand::Quit = cmd {
            break;
        }

        let event = match cmd {
            RadioCommand::Poll => {
                poll_state(&mut radio);
                RadioEvent::Polled(radio.snapshot())
            }
            cmd => match execute_command(&mut radio, cmd) {
                Ok(Some(info)) => RadioEvent::Info(info),
                Ok(None) => RadioEvent::StateUpdate(radio.snapshot()),
                Err(e) => RadioEvent::Error(format!("{e}")),
            },
        };
        if event_tx.send(event).is_err() {
            return;
        }
    }

    debug!("radio task exiting");
    let _ = event_tx.send(RadioEvent::Disconnected);
}

fn execute_command<T: Transport>(
    radio: &mut Radio<T>,
    cmd: RadioCommand,
) -> crate::Result<Option<String>> {
    match cmd {
        RadioCommand::PowerOn => {
            radio.power_on()?;
        }
        RadioCommand::PowerOff => {
            radio.power_off()?;
        }
        RadioCommand::GotoMemory(n) => {
            radio.goto_memory(n)?;
        }
        RadioCommand::SelectBank(n) => {
            radio.select_bank(n)?;
        }
        RadioCommand::SetDataMode(on) => {
            radio.set_data_mode(on)?;
        }
        RadioCommand::SetFrequency(freq) => {
            radio.set_frequency(freq)?;
        }
        RadioCommand::Transmit(stop) => {
            radio.transmit_until(&stop)?;
            return Ok(Some("back on receive".to_string()));
        }
        RadioCommand::Poll | RadioCommand::Quit => {}
    }
    Ok(None)
}

/// Best-effort refresh; a radio that does not answer keeps its cached values.
fn poll_state<T: Transport>(radio: &mut Radio<T>) {
    if let Err(e) = radio.read_frequency() {
        debug!("poll frequency: {e}");
    }
    if let Err(e) = radio.read_mode() {
        debug!("poll mode: {e}");
    }
    if let Err(e) = radio.read_s_meter() {
        debug!("poll S-meter: {e}");
    }
    if let Err(e) = radio.read_swr_meter() {
        debug!("poll SWR: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::radio::RadioConfig;
    use crate::transport::mock::MockTransport;

    const OK_REPLY: [u8; 6] = [0xFE, 0xFE, 0xE0, 0x88, 0xFB, 0xFD];
    const NG_REPLY: [u8; 6] = [0xFE, 0xFE, 0xE0, 0x88, 0xFA, 0xFD];

    #[test]
    fn test_loop_reports_state_and_errors() {
        let mock = MockTransport::new();
        mock.reply(&OK_REPLY).reply(&NG_REPLY);
        let radio = Radio::new(mock.clone(), RadioConfig::default());

        let (cmd_tx, cmd_rx) = std_mpsc::channel();
        let (event_tx, mut event_rx) = tokio_mpsc::unbounded_channel();

        cmd_tx.send(RadioCommand::GotoMemory(42)).unwrap();
        cmd_tx.send(RadioCommand::SelectBank(2)).unwrap();
        cmd_tx.send(RadioCommand::Quit).unwrap();
        radio_loop(radio, cmd_rx, event_tx);

        match event_rx.try_recv().unwrap() {
            RadioEvent::StateUpdate(state) => assert_eq!(state.memory_num, 42),
            other => panic!("expected state update, got {other:?}"),
        }
        assert!(matches!(event_rx.try_recv().unwrap(), RadioEvent::Error(_)));
        assert!(matches!(
            event_rx.try_recv().unwrap(),
            RadioEvent::Disconnected
        ));
        assert_eq!(mock.written().len(), 2);
    }

    #[test]
    fn test_poll_survives_silent_radio() {
        let mock = MockTransport::new();
        let radio = Radio::new(mock.clone(), RadioConfig::default());

        let (cmd_tx, cmd_rx) = std_mpsc::channel();
        let (event_tx, mut event_rx) = tokio_mpsc::unbounded_channel();
        cmd_tx.send(RadioCommand::Poll).unwrap();
        drop(cmd_tx);
        radio_loop(radio, cmd_rx, event_tx);

        assert!(matches!(
            event_rx.try_recv().unwrap(),
            RadioEvent::Polled(_)
        ));
        assert_eq!(mock.written().len(), 4);
    }

    #[test]
    fn test_poll_reports_refreshed_state() {
        let mock = MockTransport::new();
        mock.reply(&[0xFE, 0xFE, 0xE0, 0x88, 0x03, 0x00, 0x40, 0x07, 0x14, 0x00, 0xFD]);
        let radio = Radio::new(mock, RadioConfig::default());

        let (cmd_tx, cmd_rx) = std_mpsc::channel();
        let (event_tx, mut event_rx) = tokio_mpsc::unbounded_channel();
        cmd_tx.send(RadioCommand::Poll).unwrap();
        drop(cmd_tx);
        radio_loop(radio, cmd_rx, event_tx);

        match event_rx.try_recv().unwrap() {
            RadioEvent::Polled(state) => assert_eq!(state.frequency.hz(), 14_074_000),
            other => panic!("expected poll result, got {other:?}"),
        }
    }
}
