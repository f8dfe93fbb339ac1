//! Session error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid file path pattern: {0}")]
    InvalidFilePath(String),

    #[error("The url does not use http: {0:?}")]
    NotHttp(String),

    #[error("No valid process id was given")]
    EmptyProcessId,
}
