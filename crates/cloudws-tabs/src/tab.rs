//! Workspace tab data
//!
//! Key mapping:
//! - editor tabs ↦ their path
//! - every other tab ↦ its kind name (`shell`, `console`, `evaluation`,
//!   `instructions`, `empty`)
//!
//! An empty key or a bare `editor` key reads back as the empty tab.

use serde::{Deserialize, Serialize};

use crate::error::TabError;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TabKind {
    Editor,
    Shell,
    Console,
    Evaluation,
    Instructions,
    Empty,
}

impl TabKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TabKind::Editor => "editor",
            TabKind::Shell => "shell",
            TabKind::Console => "console",
            TabKind::Evaluation => "evaluation",
            TabKind::Instructions => "instructions",
            TabKind::Empty => "empty",
        }
    }
}

impl std::fmt::Display for TabKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TabKind {
    type Err = TabError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "editor" => Ok(TabKind::Editor),
            "shell" => Ok(TabKind::Shell),
            "console" => Ok(TabKind::Console),
            "evaluation" => Ok(TabKind::Evaluation),
            "instructions" => Ok(TabKind::Instructions),
            "empty" => Ok(TabKind::Empty),
            other => Err(TabError::UnknownTabKind(other.to_string())),
        }
    }
}

/// Non-empty file path of an editor tab.
///
/// Kind names are rejected so every editor key reads back as the same tab.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EditorPath(String);

impl EditorPath {
    pub fn new(path: impl Into<String>) -> Result<Self> {
        let path = path.into();
        if path.is_empty() {
            return Err(TabError::EmptyEditorPath);
        }
        if path.parse::<TabKind>().is_ok() {
            return Err(TabError::ReservedEditorPath(path));
        }
        Ok(Self(path))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EditorPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum WorkspaceTab {
    Editor(EditorPath),
    Shell,
    Console,
    Evaluation,
    Instructions,
    Empty,
}

impl WorkspaceTab {
    pub fn editor(path: impl Into<String>) -> Result<Self> {
        Ok(WorkspaceTab::Editor(EditorPath::new(path)?))
    }

    /// Tab of a kind without a path
    pub fn of_kind(kind: TabKind) -> Result<Self> {
        match kind {
            TabKind::Editor => Err(TabError::EmptyEditorPath),
            TabKind::Shell => Ok(WorkspaceTab::Shell),
            TabKind::Console => Ok(WorkspaceTab::Console),
            TabKind::Evaluation => Ok(WorkspaceTab::Evaluation),
            TabKind::Instructions => Ok(WorkspaceTab::Instructions),
            TabKind::Empty => Ok(WorkspaceTab::Empty),
        }
    }

    pub fn kind(&self) -> TabKind {
        match self {
            WorkspaceTab::Editor(_) => TabKind::Editor,
            WorkspaceTab::Shell => TabKind::Shell,
            WorkspaceTab::Console => TabKind::Console,
            WorkspaceTab::Evaluation => TabKind::Evaluation,
            WorkspaceTab::Instructions => TabKind::Instructions,
            WorkspaceTab::Empty => TabKind::Empty,
        }
    }

    pub fn path(&self) -> Option<&str> {
        match self {
            WorkspaceTab::Editor(path) => Some(path.as_str()),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, WorkspaceTab::Empty)
    }

    pub fn to_key(&self) -> String {
        match self {
            WorkspaceTab::Editor(path) => path.to_string(),
            other => other.kind().as_str().to_string(),
        }
    }

    pub fn from_key(key: &str) -> Self {
        match key.parse::<TabKind>() {
            Ok(TabKind::Editor) => WorkspaceTab::Empty,
            Ok(kind) => WorkspaceTab::of_kind(kind).unwrap_or(WorkspaceTab::Empty),
            Err(_) => WorkspaceTab::editor(key).unwrap_or(WorkspaceTab::Empty),
        }
    }
}

impl std::fmt::Display for WorkspaceTab {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkspaceTab::Editor(path) => write!(f, "editor:{}", path),
            other => write!(f, "{}", other.kind()),
        }
    }
}

impl From<WorkspaceTab> for String {
    fn from(tab: WorkspaceTab) -> Self {
        tab.to_key()
    }
}

impl From<String> for WorkspaceTab {
    fn from(key: String) -> Self {
        WorkspaceTab::from_key(&key)
    }
}
