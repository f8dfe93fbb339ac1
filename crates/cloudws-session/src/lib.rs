//! cloudws Session Registry
//!
//! A session is bound to one companion base URL for the lifetime of a page
//! session. Every endpoint is derived from that base URL:
//! - files: `{base}files/{relativePath}`
//! - control plane: `ws(s)://…/graphql`
//! - terminals: `ws(s)://…/process/{id}`

mod address;
mod error;
mod probe;
mod registry;

pub use address::{
    extract_relative_file_path, graphql_websocket_path, http_to_ws, process_websocket_path,
    read_file_path, with_trailing_slash, write_file_path, FILES_API_ROUTE, GRAPHQL_API_ROUTE,
    PROCESS_API_ROUTE, WRITE_FILE_FORM_KEY,
};
pub use error::SessionError;
pub use probe::Backoff;
pub use registry::{Availability, SessionRegistry};

pub type Result<T> = std::result::Result<T, SessionError>;
