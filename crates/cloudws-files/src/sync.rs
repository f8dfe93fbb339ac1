//! File tree synchronizer
//!
//! Holds the current tree snapshot and applies directory loads and mutations
//! to it. Mutations reload only the parent directory of the touched path.

use parking_lot::RwLock;
use std::sync::Arc;

use crate::api::{FileApi, PathKind};
use crate::error::FileError;
use crate::path::{is_root, parent_dir, sanitize_path};
use crate::tree::{find_node, merge_level, FileTreeNode};
use crate::Result;

/// Pending delete; only [`FileTreeSynchronizer::confirm_delete`] fires it
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a delete only happens once the confirmation is confirmed"]
pub struct DeleteConfirmation {
    path: String,
    prompt: String,
}

impl DeleteConfirmation {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }
}

pub struct FileTreeSynchronizer {
    api: Arc<dyn FileApi>,
    tree: Arc<RwLock<Arc<Vec<FileTreeNode>>>>,
}

impl FileTreeSynchronizer {
    pub fn new(api: Arc<dyn FileApi>) -> Self {
        Self {
            api,
            tree: Arc::new(RwLock::new(Arc::new(Vec::new()))),
        }
    }

    /// Current tree; never a partially merged one
    pub fn snapshot(&self) -> Arc<Vec<FileTreeNode>> {
        Arc::clone(&self.tree.read())
    }

    pub fn find(&self, path: &str) -> Option<FileTreeNode> {
        find_node(&self.snapshot(), path).cloned()
    }

    /// One level below `path` straight from the companion
    pub async fn list_children(&self, path: &str) -> Result<Vec<FileTreeNode>> {
        let nodes = self.api.list_files(path).await?;
        Ok(nodes.into_iter().map(FileTreeNode::from).collect())
    }

    /// Load one level and merge it into the tree
    pub async fn load(&self, path: &str) -> Result<Arc<Vec<FileTreeNode>>> {
        let children = self.list_children(path).await?;

        let mut tree = self.tree.write();
        let merged = Arc::new(merge_level(path, &tree, children));
        *tree = Arc::clone(&merged);

        tracing::debug!(path = %path, "Merged directory level");
        Ok(merged)
    }

    pub async fn create(&self, path: &str, kind: PathKind) -> Result<Arc<Vec<FileTreeNode>>> {
        check_entry_path(path)?;
        self.api.create_path(path, kind).await?;
        self.load(&parent_dir(path)).await
    }

    pub fn request_delete(&self, path: &str) -> DeleteConfirmation {
        DeleteConfirmation {
            path: path.to_string(),
            prompt: format!(
                "Are you sure you want to delete '{}'?",
                path.trim_start_matches('/')
            ),
        }
    }

    pub async fn confirm_delete(
        &self,
        confirmation: DeleteConfirmation,
    ) -> Result<Arc<Vec<FileTreeNode>>> {
        check_entry_path(&confirmation.path)?;
        self.api.delete_path(&confirmation.path).await?;
        self.load(&parent_dir(&confirmation.path)).await
    }
}

/// Mutations need a path naming an entry below the root
fn check_entry_path(path: &str) -> Result<()> {
    if is_root(path) || sanitize_path(path).is_empty() {
        return Err(FileError::InvalidPath(path.to_string()));
    }
    Ok(())
}

impl Clone for FileTreeSynchronizer {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            tree: Arc::clone(&self.tree),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{dir, file, MemoryFileApi};

    fn workspace() -> Arc<MemoryFileApi> {
        Arc::new(
            MemoryFileApi::default()
                .with_listing("/", vec![dir("/a"), file("/main.py")])
                .with_listing("/a", vec![dir("/a/x"), file("/a/y")])
                .with_listing("/a/x", vec![file("/a/x/x1")]),
        )
    }

    #[tokio::test]
    async fn test_partial_reload_keeps_subtree() {
        let api = workspace();
        let sync = FileTreeSynchronizer::new(api.clone());
        sync.load("").await.unwrap();
        sync.load("/a").await.unwrap();
        sync.load("/a/x").await.unwrap();

        api.set_listing("/a", vec![dir("/a/x"), file("/a/z")]);
        sync.load("/a").await.unwrap();

        let a = sync.find("/a").unwrap();
        let children: Vec<_> = a.children.unwrap().into_iter().map(|c| c.path).collect();
        assert_eq!(children, vec!["/a/x", "/a/z"]);
        assert!(sync.find("/a/x/x1").is_some());
        assert!(sync.find("/a/y").is_none());
    }

    #[tokio::test]
    async fn test_root_reload_keeps_subtree() {
        let api = workspace();
        let sync = FileTreeSynchronizer::new(api.clone());
        sync.load("/").await.unwrap();
        sync.load("/a").await.unwrap();

        sync.load("").await.unwrap();
        assert!(sync.find("/a/y").is_some());
    }

    #[tokio::test]
    async fn test_create_reloads_parent_only() {
        let api = workspace();
        let sync = FileTreeSynchronizer::new(api.clone());
        sync.load("/").await.unwrap();
        sync.load("/a").await.unwrap();
        api.listed.lock().clear();

        api.set_listing("/a", vec![dir("/a/x"), file("/a/y"), file("/a/new.txt")]);
        sync.create("/a/new.txt", PathKind::File).await.unwrap();

        assert_eq!(*api.listed.lock(), vec!["/a".to_string()]);
        assert_eq!(
            *api.created.lock(),
            vec![("/a/new.txt".to_string(), PathKind::File)]
        );
        assert!(sync.find("/a/new.txt").unwrap().is_leaf);
    }

    #[tokio::test]
    async fn test_delete_needs_confirmation() {
        let api = workspace();
        let sync = FileTreeSynchronizer::new(api.clone());
        sync.load("/").await.unwrap();

        let confirmation = sync.request_delete("/main.py");
        assert_eq!(confirmation.prompt(), "Are you sure you want to delete 'main.py'?");
        assert!(api.deleted.lock().is_empty());

        api.set_listing("/", vec![dir("/a")]);
        let tree = sync.confirm_delete(confirmation).await.unwrap();

        assert_eq!(*api.deleted.lock(), vec!["/main.py".to_string()]);
        assert_eq!(tree.len(), 1);
        assert_eq!(*api.listed.lock().last().unwrap(), "/");
    }

    #[tokio::test]
    async fn test_root_cannot_be_mutated() {
        let api = workspace();
        let sync = FileTreeSynchronizer::new(api.clone());

        assert!(matches!(
            sync.create("/", PathKind::Directory).await,
            Err(FileError::InvalidPath(_))
        ));
        assert!(matches!(
            sync.confirm_delete(sync.request_delete("/a/..")).await,
            Err(FileError::InvalidPath(_))
        ));
        assert!(api.created.lock().is_empty());
        assert!(api.deleted.lock().is_empty());
        assert!(api.listed.lock().is_empty());
    }

    #[tokio::test]
    async fn test_listing_error_keeps_tree() {
        let api = Arc::new(MemoryFileApi {
            fail_listing: true,
            ..Default::default()
        });
        let sync = FileTreeSynchronizer::new(api);

        assert!(matches!(sync.load("/").await, Err(FileError::Graphql(_))));
        assert!(sync.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_snapshots_are_immutable() {
        let api = workspace();
        let sync = FileTreeSynchronizer::new(api.clone());
        sync.load("/").await.unwrap();

        let before = sync.snapshot();
        sync.load("/a").await.unwrap();

        assert!(find_node(&before, "/a").unwrap().children.is_none());
        assert!(sync.find("/a").unwrap().children.is_some());
    }
}
