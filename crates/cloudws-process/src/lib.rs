//! cloudws Process Multiplexer
//!
//! - One shared control-plane channel per session issues `startProcess`
//! - Every terminal attachment gets its own channel, addressed by process id
//! - Several views may attach to the same process at once

mod channel;
mod error;
mod graphql_ws;
mod multiplexer;
mod slot;
mod terminal;

pub use channel::{ControlChannel, GraphqlRequest, SubscriptionEvent};
pub use error::ProcessError;
pub use graphql_ws::{GraphqlWsChannel, GRAPHQL_WS_PROTOCOL};
pub use multiplexer::{ProcessHandle, ProcessMultiplexer, DEFAULT_SHELL_COMMAND};
pub use slot::{ProcessSlot, SlotStatus, StartState};
pub use terminal::{TerminalConnector, TerminalStream, WsTerminalConnector};

pub type Result<T> = std::result::Result<T, ProcessError>;
