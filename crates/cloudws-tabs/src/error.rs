//! Tab error types

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TabError {
    #[error("Editor tabs need a non-empty path")]
    EmptyEditorPath,

    #[error("Editor path collides with a tab kind: {0}")]
    ReservedEditorPath(String),

    #[error("Unknown tab kind: {0}")]
    UnknownTabKind(String),

    #[error("Tab not open: {0}")]
    NotOpen(String),
}
