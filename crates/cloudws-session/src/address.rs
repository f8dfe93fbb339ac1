//! Companion address derivation
//!
//! Pure string functions; all of them agree on one rule: the base URL is
//! normalized to end with exactly one `/` before a route is appended.

use crate::error::SessionError;
use crate::Result;

pub const FILES_API_ROUTE: &str = "files";
pub const GRAPHQL_API_ROUTE: &str = "graphql";
pub const PROCESS_API_ROUTE: &str = "process";
/// Multipart form key under which file contents are uploaded
pub const WRITE_FILE_FORM_KEY: &str = "files";

pub fn with_trailing_slash(path: &str) -> String {
    let trimmed = path.trim();
    if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{}/", trimmed)
    }
}

/// URL a file is read from (and deleted at)
pub fn read_file_path(base_url: &str, file_path: &str) -> String {
    let separator = if file_path.starts_with('/') { "" } else { "/" };
    format!(
        "{}{}{}{}",
        with_trailing_slash(base_url),
        FILES_API_ROUTE,
        separator,
        file_path
    )
}

/// URL files are uploaded to
pub fn write_file_path(base_url: &str) -> String {
    let separator = if base_url.ends_with('/') { "" } else { "/" };
    format!("{}{}{}", base_url, separator, FILES_API_ROUTE)
}

/// Path relative to the files route, e.g. `bar/foo.txt` for
/// `https://host/files/bar/foo.txt`.
///
/// Requires something in front of `/files/`, a bare `/files/…` has no base.
pub fn extract_relative_file_path(path: &str) -> Result<&str> {
    let pattern = format!("/{}/", FILES_API_ROUTE);
    match path.find(&pattern) {
        Some(index) if index > 0 => Ok(&path[index + pattern.len()..]),
        _ => Err(SessionError::InvalidFilePath(path.to_string())),
    }
}

/// `http://` → `ws://`, `https://` → `wss://`
pub fn http_to_ws(url: &str) -> Result<String> {
    if let Some(rest) = url.strip_prefix("https://") {
        return Ok(format!("wss://{}", rest));
    }
    if let Some(rest) = url.strip_prefix("http://") {
        return Ok(format!("ws://{}", rest));
    }
    Err(SessionError::NotHttp(url.to_string()))
}

pub fn graphql_websocket_path(base_url: &str) -> Result<String> {
    http_to_ws(&format!(
        "{}{}",
        with_trailing_slash(base_url),
        GRAPHQL_API_ROUTE
    ))
}

pub fn process_websocket_path(base_url: &str, process_id: &str) -> Result<String> {
    if process_id.is_empty() {
        return Err(SessionError::EmptyProcessId);
    }
    http_to_ws(&format!(
        "{}{}/{}",
        with_trailing_slash(base_url),
        PROCESS_API_ROUTE,
        process_id
    ))
}
