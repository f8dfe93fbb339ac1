//! cloudws Tab Management
//!
//! Open views of a workspace page form an ordered collection per pane.
//! A tab is plain data, `(kind, path)`, and every tab maps to a string key so
//! the active tab of each pane can live in the page address.

mod error;
mod layout;
mod manager;
mod render;
mod tab;

pub use error::TabError;
pub use layout::{TabLayout, LEFT_TAB_QUERY_PARAM, RIGHT_TAB_QUERY_PARAM};
pub use manager::TabSessionManager;
pub use render::{TabRenderer, TitleRenderer};
pub use tab::{EditorPath, TabKind, WorkspaceTab};

pub type Result<T> = std::result::Result<T, TabError>;
