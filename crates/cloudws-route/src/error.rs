//! Route error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RouteError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid base URL template: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Route not found: {0}")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
