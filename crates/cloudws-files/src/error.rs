//! File error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FileError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("GraphQL error: {0}")]
    Graphql(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Session error: {0}")]
    Session(#[from] cloudws_session::SessionError),

    #[error("Auto-save is no longer running")]
    SaverClosed,
}
