//! Path helpers for tree keys and user-entered names

use serde::{Deserialize, Serialize};

/// `''` and `'/'` both denote the workspace root
pub fn is_root(path: &str) -> bool {
    path.is_empty() || path == "/"
}

/// Same path with exactly one leading `/`
pub fn absolute_path(path: &str) -> String {
    format!("/{}", path.trim_start_matches('/'))
}

pub fn file_name(path: &str) -> &str {
    match path.rfind('/') {
        Some(index) => &path[index + 1..],
        None => path,
    }
}

/// Parent directory, `/` for top-level entries
pub fn parent_dir(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(index) if index > 0 => trimmed[..index].to_string(),
        _ => "/".to_string(),
    }
}

/// All ancestors from nearest to farthest, excluding the root
pub fn parent_dirs(path: &str) -> Vec<String> {
    let mut parents = Vec::new();
    let mut current = path.trim_end_matches('/');
    while let Some(index) = current.rfind('/') {
        if index == 0 {
            break;
        }
        current = &current[..index];
        parents.push(current.to_string());
    }
    parents
}

/// Normalize a user-entered relative name.
///
/// `.` and empty segments vanish, `..` removes the previous segment and can
/// never climb above the starting directory. Surrounding whitespace is kept.
pub fn sanitize_path(name: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in name.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// `parent` + `/` + `name` with exactly one separator
pub fn join_child(parent: &str, name: &str) -> String {
    let parent = if parent.ends_with('/') {
        parent.to_string()
    } else {
        format!("{}/", parent)
    };
    format!("{}{}", parent, name.trim_start_matches('/'))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RightClickedItem {
    pub path: String,
    pub is_file: bool,
}

/// Directory a new entry is created in: the clicked directory itself, the
/// parent of a clicked file, or the root when nothing was clicked
pub fn name_input_parent(item: Option<&RightClickedItem>) -> String {
    match item {
        None => "/".to_string(),
        Some(item) if item.is_file => parent_dir(&item.path),
        Some(item) => item.path.clone(),
    }
}
