//! Core error types

use thiserror::Error;

use cloudws_files::FileError;
use cloudws_process::ProcessError;
use cloudws_tabs::TabError;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Route error: {0}")]
    Route(#[from] cloudws_route::RouteError),

    #[error("Session error: {0}")]
    Session(#[from] cloudws_session::SessionError),

    #[error("Process error: {0}")]
    Process(#[from] ProcessError),

    #[error("File error: {0}")]
    File(#[from] FileError),

    #[error("Tab error: {0}")]
    Tab(#[from] TabError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Coarse classification callers branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input or settings, fails before any I/O
    Configuration,
    /// Channel not established yet; nothing was sent
    NotReady,
    /// The companion or transport failed
    Protocol,
    NotFound,
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::Route(cloudws_route::RouteError::NotFound(_)) => ErrorKind::NotFound,
            CoreError::Route(_) => ErrorKind::Configuration,
            CoreError::Session(_) => ErrorKind::Configuration,
            CoreError::Process(ProcessError::NotReady) => ErrorKind::NotReady,
            CoreError::Process(ProcessError::Session(_)) => ErrorKind::Configuration,
            CoreError::Process(_) => ErrorKind::Protocol,
            CoreError::File(FileError::NotFound(_)) => ErrorKind::NotFound,
            CoreError::File(FileError::InvalidPath(_) | FileError::Session(_)) => {
                ErrorKind::Configuration
            }
            CoreError::File(_) => ErrorKind::Protocol,
            CoreError::Tab(TabError::NotOpen(_)) => ErrorKind::NotFound,
            CoreError::Tab(_) => ErrorKind::Configuration,
            CoreError::Serialization(_) | CoreError::Io(_) | CoreError::Config(_) => {
                ErrorKind::Configuration
            }
        }
    }
}
