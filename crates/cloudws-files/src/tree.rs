//! File tree nodes and level merging
//!
//! Nodes are keyed by their absolute path. `children == None` means the level
//! below was never loaded, `Some(vec![])` means it was loaded and is empty.

use serde::{Deserialize, Serialize};

use crate::path::is_root;

/// Entry returned by the companion's `listFiles` query.
/// Only files carry a size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSystemNode {
    pub path: String,
    #[serde(default)]
    pub size: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileTreeNode {
    pub path: String,
    pub is_leaf: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<FileTreeNode>>,
}

impl FileTreeNode {
    pub fn file(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            is_leaf: true,
            children: None,
        }
    }

    pub fn directory(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            is_leaf: false,
            children: None,
        }
    }

    pub fn with_children(mut self, children: Vec<FileTreeNode>) -> Self {
        self.children = Some(children);
        self
    }

    /// Last path segment, used as the display title
    pub fn name(&self) -> &str {
        crate::path::file_name(&self.path)
    }

    pub fn is_loaded(&self) -> bool {
        self.children.is_some()
    }
}

impl From<FileSystemNode> for FileTreeNode {
    fn from(node: FileSystemNode) -> Self {
        Self {
            is_leaf: node.size.is_some(),
            path: node.path,
            children: None,
        }
    }
}

/// Carry loaded children of `existing` over to the matching `newly_loaded`
/// nodes. Nodes missing from `newly_loaded` are dropped.
pub fn include_existing_children(
    newly_loaded: Vec<FileTreeNode>,
    existing: &[FileTreeNode],
) -> Vec<FileTreeNode> {
    newly_loaded
        .into_iter()
        .map(|mut node| {
            let previous = existing
                .iter()
                .find(|e| e.path == node.path)
                .and_then(|e| e.children.clone());
            if previous.is_some() {
                node.children = previous;
            }
            node
        })
        .collect()
}

/// Replace the children of the node at `path` with `newly_loaded`.
/// A tree without a node at `path` comes back unchanged.
pub fn insert_nodes(
    path: &str,
    existing: &[FileTreeNode],
    newly_loaded: &[FileTreeNode],
) -> Vec<FileTreeNode> {
    existing
        .iter()
        .map(|node| {
            if node.path == path {
                let previous = node.children.as_deref().unwrap_or_default();
                FileTreeNode {
                    children: Some(include_existing_children(newly_loaded.to_vec(), previous)),
                    ..node.clone()
                }
            } else if let Some(children) = &node.children {
                FileTreeNode {
                    children: Some(insert_nodes(path, children, newly_loaded)),
                    ..node.clone()
                }
            } else {
                node.clone()
            }
        })
        .collect()
}

/// Merge one freshly listed directory level into `tree`
pub fn merge_level(
    path: &str,
    tree: &[FileTreeNode],
    newly_loaded: Vec<FileTreeNode>,
) -> Vec<FileTreeNode> {
    if is_root(path) {
        include_existing_children(newly_loaded, tree)
    } else {
        insert_nodes(path, tree, &newly_loaded)
    }
}

pub fn find_node<'a>(nodes: &'a [FileTreeNode], path: &str) -> Option<&'a FileTreeNode> {
    for node in nodes {
        if node.path == path {
            return Some(node);
        }
        let below = path
            .strip_prefix(node.path.as_str())
            .is_some_and(|rest| rest.starts_with('/'));
        if below {
            return node.children.as_deref().and_then(|c| find_node(c, path));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<FileTreeNode> {
        vec![
            FileTreeNode::directory("/a").with_children(vec![
                FileTreeNode::directory("/a/x").with_children(vec![FileTreeNode::file("/a/x/x1")]),
                FileTreeNode::file("/a/y"),
            ]),
            FileTreeNode::file("/main.py"),
        ]
    }

    #[test]
    fn test_from_file_system_node() {
        let file: FileTreeNode = FileSystemNode {
            path: "/main.py".into(),
            size: Some(12),
        }
        .into();
        let dir: FileTreeNode = FileSystemNode {
            path: "/src".into(),
            size: None,
        }
        .into();

        assert!(file.is_leaf);
        assert!(!dir.is_leaf);
        assert!(!dir.is_loaded());
        assert_eq!(file.name(), "main.py");
    }

    #[test]
    fn test_reload_keeps_loaded_children() {
        let merged = merge_level(
            "/a",
            &sample(),
            vec![FileTreeNode::directory("/a/x"), FileTreeNode::file("/a/z")],
        );

        let a = find_node(&merged, "/a").unwrap();
        assert_eq!(
            a.children,
            Some(vec![
                FileTreeNode::directory("/a/x").with_children(vec![FileTreeNode::file("/a/x/x1")]),
                FileTreeNode::file("/a/z"),
            ])
        );
        assert!(find_node(&merged, "/a/y").is_none());
        assert!(find_node(&merged, "/main.py").is_some());
    }

    #[test]
    fn test_merge_is_idempotent() {
        let newly = vec![FileTreeNode::directory("/a/x"), FileTreeNode::file("/a/z")];
        let once = merge_level("/a", &sample(), newly.clone());
        let twice = merge_level("/a", &once, newly);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_root_reload() {
        let tree = sample();
        for root in ["", "/"] {
            let merged = merge_level(
                root,
                &tree,
                vec![FileTreeNode::directory("/a"), FileTreeNode::file("/README.md")],
            );
            assert_eq!(merged.len(), 2);
            assert_eq!(merged[0], tree[0]);
            assert_eq!(merged[1].path, "/README.md");
        }
    }

    #[test]
    fn test_unknown_path_leaves_tree_unchanged() {
        let tree = sample();
        let merged = merge_level("/missing", &tree, vec![FileTreeNode::file("/missing/f")]);
        assert_eq!(merged, tree);
    }

    #[test]
    fn test_find_node() {
        let tree = sample();
        assert_eq!(find_node(&tree, "/a/x/x1").unwrap().path, "/a/x/x1");
        assert!(find_node(&tree, "/a/x/x2").is_none());
        // Prefix of a sibling name is not an ancestor
        assert!(find_node(&tree, "/ab").is_none());
    }
}
