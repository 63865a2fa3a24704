use std::env;
use std::process;
use std::sync::mpsc as std_mpsc;

use log::info;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc as tokio_mpsc, watch};
use tokio_util::sync::CancellationToken;

use ic7100_remote::cli::input::{self, Input};
use ic7100_remote::cli::message::{RadioCommand, RadioEvent};
use ic7100_remote::cli::radio_task;
use ic7100_remote::{Direction, Radio, RadioConfig, RadioState};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let mut args = env::args().skip(1);
    let port = args.next();
    let mut config = RadioConfig::default();
    if let Some(baud) = args.next() {
        match baud.parse() {
            Ok(baud) => config.baud_rate = baud,
            Err(_) => {
                eprintln!("Invalid baud rate: {baud}");
                eprintln!("Usage: ic7100-remote [PORT] [BAUD]");
                process::exit(2);
            }
        }
    }

    // Connect in plain sync context (before the tokio runtime starts).
    println!("IC-7100 remote control");
    println!("======================");
    let connected = match &port {
        Some(port) => Radio::connect(port, config),
        None => Radio::auto_connect(config),
    };
    let mut radio = match connected {
        Ok(r) => {
            println!("Connected.");
            r
        }
        Err(e) => {
            eprintln!("Failed to connect: {e}");
            eprintln!();
            eprintln!("Troubleshooting:");
            eprintln!("  1. Connect the IC-7100 via USB, or pass the port name");
            eprintln!("  2. Ensure the following settings on the radio:");
            eprintln!("     Menu > Set > Connectors > CI-V");
            eprintln!("         CI-V Address = 88h");
            eprintln!("         CI-V Baud Rate = the rate given here (default 9600)");
            eprintln!("         CI-V USB Echo Back = OFF");
            process::exit(1);
        }
    };

    radio.set_observer(Box::new(|dir: Direction, bytes: &[u8]| {
        let arrow = match dir {
            Direction::Tx => ">>",
            Direction::Rx => "<<",
        };
        info!("{arrow} {}", hex(bytes));
    }));

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to start runtime: {e}");
            process::exit(1);
        }
    };

    rt.block_on(async {
        // Console → Radio: std::sync::mpsc (radio thread is blocking).
        let (cmd_tx, cmd_rx) = std_mpsc::channel();
        // Radio → Console: tokio unbounded.
        let (event_tx, event_rx) = tokio_mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(radio.snapshot());

        let radio_handle = tokio::task::spawn_blocking(move || {
            radio_task::radio_loop(radio, cmd_rx, event_tx);
        });
        tokio::spawn(report_events(event_rx, state_tx));

        run_console(cmd_tx, state_rx).await;
        let _ = radio_handle.await;
    });
}

async fn report_events(
    mut event_rx: tokio_mpsc::UnboundedReceiver<RadioEvent>,
    state_tx: watch::Sender<RadioState>,
) {
    while let Some(event) = event_rx.recv().await {
        match event {
            RadioEvent::StateUpdate(state) => {
                let _ = state_tx.send(state);
            }
            RadioEvent::Polled(state) => {
                print_state(&state);
                let _ = state_tx.send(state);
            }
            RadioEvent::Info(msg) => println!("{msg}"),
            RadioEvent::Error(msg) => eprintln!("error: {msg}"),
            RadioEvent::Disconnected => break,
        }
    }
}

async fn run_console(cmd_tx: std_mpsc::Sender<RadioCommand>, state_rx: watch::Receiver<RadioState>) {
    println!("{}", input::HELP);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                eprintln!("stdin: {e}");
                break;
            }
        };

        let parsed = match input::parse_line(&line) {
            Ok(Some(parsed)) => parsed,
            Ok(None) => continue,
            Err(e) => {
                eprintln!("{e}");
                println!("{}", input::HELP);
                continue;
            }
        };

        let cmd = match parsed {
            Input::Quit => break,
            Input::Status => RadioCommand::Poll,
            Input::Transmit => {
                let stop = CancellationToken::new();
                if cmd_tx.send(RadioCommand::Transmit(stop.clone())).is_err() {
                    break;
                }
                println!("Transmitting. Press Enter to stop.");
                let _ = lines.next_line().await;
                stop.cancel();
                continue;
            }
            Input::ToggleDataMode => RadioCommand::SetDataMode(!state_rx.borrow().data_mode),
            Input::Memory(n) => RadioCommand::GotoMemory(n),
            Input::Bank(n) => RadioCommand::SelectBank(n),
            Input::PowerOn => RadioCommand::PowerOn,
            Input::PowerOff => RadioCommand::PowerOff,
            Input::Frequency(freq) => RadioCommand::SetFrequency(freq),
        };
        if cmd_tx.send(cmd).is_err() {
            break;
        }
    }

    let _ = cmd_tx.send(RadioCommand::Quit);
}

fn print_state(state: &RadioState) {
    println!(
        "{} {}  mem {}/{}  {}  data {}  power {:.0}%  S {}  SWR {}",
        state.frequency,
        state.mode,
        state.memory_bank,
        state.memory_num,
        if state.transmitting { "TX" } else { "RX" },
        if state.data_mode { "on" } else { "off" },
        state.power_frac * 100.0,
        state.signal_meter,
        state.swr_meter,
    );
}

fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}
