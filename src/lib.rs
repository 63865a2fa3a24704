pub mod bcd;
pub mod cli;
pub mod command;
pub mod error;
pub mod frequency;
pub mod mode;
pub mod protocol;
pub mod radio;
pub mod response;
pub mod session;
pub mod state;
pub mod transport;

pub use error::{CivError, FrameError, Result};
pub use frequency::Frequency;
pub use mode::{Filter, OperatingMode};
pub use radio::{Direction, Radio, RadioConfig};
pub use response::{Ack, Response};
pub use session::SharedRadio;
pub use state::RadioState;
pub use transport::Transport;
