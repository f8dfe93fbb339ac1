//! cloudws File Tree
//!
//! Path-keyed cache of the companion's filesystem. Directories are loaded one
//! level at a time and merged in without losing subtrees that were already
//! loaded. Every update swaps in a new tree value.

mod api;
mod autosave;
mod error;
mod path;
mod sync;
mod tree;

pub use api::{FileApi, HttpFileApi, PathKind};
pub use autosave::{AutoSaver, SaveAction, SaveMachine, SaveState, DEFAULT_SAVE_WINDOW};
pub use error::FileError;
pub use path::{
    absolute_path, file_name, is_root, join_child, name_input_parent, parent_dir, parent_dirs, sanitize_path,
    RightClickedItem,
};
pub use sync::{DeleteConfirmation, FileTreeSynchronizer};
pub use tree::{
    find_node, include_existing_children, insert_nodes, merge_level, FileSystemNode, FileTreeNode,
};

pub type Result<T> = std::result::Result<T, FileError>;
