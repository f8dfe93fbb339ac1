//! Process error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Control channel is not ready yet")]
    NotReady,

    #[error("No process id was returned")]
    NoProcessId,

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Session error: {0}")]
    Session(#[from] cloudws_session::SessionError),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
}
