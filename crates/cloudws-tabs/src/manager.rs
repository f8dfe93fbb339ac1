//! Tab Session Manager
//!
//! Ordered tabs of one pane plus the active one. `open` never adds a second
//! tab with the same identity; `with_tabs` takes whatever it is given.

use parking_lot::RwLock;
use std::sync::Arc;

use crate::error::TabError;
use crate::tab::WorkspaceTab;
use crate::Result;

#[derive(Debug, Clone)]
struct TabGroup {
    tabs: Vec<WorkspaceTab>,
    /// `Empty` when nothing is active
    active: WorkspaceTab,
}

pub struct TabSessionManager {
    group: Arc<RwLock<TabGroup>>,
}

impl TabSessionManager {
    pub fn new() -> Self {
        Self::with_tabs(Vec::new())
    }

    /// First tab becomes active
    pub fn with_tabs(tabs: Vec<WorkspaceTab>) -> Self {
        let active = tabs.first().cloned().unwrap_or(WorkspaceTab::Empty);
        Self {
            group: Arc::new(RwLock::new(TabGroup { tabs, active })),
        }
    }

    pub fn tabs(&self) -> Vec<WorkspaceTab> {
        self.group.read().tabs.clone()
    }

    pub fn len(&self) -> usize {
        self.group.read().tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.group.read().tabs.is_empty()
    }

    pub fn active(&self) -> WorkspaceTab {
        self.group.read().active.clone()
    }

    /// Key of the active tab, as stored in the page address
    pub fn active_key(&self) -> String {
        self.group.read().active.to_key()
    }

    pub fn index_of(&self, tab: &WorkspaceTab) -> Option<usize> {
        self.group.read().tabs.iter().position(|t| t == tab)
    }

    pub fn contains(&self, tab: &WorkspaceTab) -> bool {
        self.index_of(tab).is_some()
    }

    /// Activate `tab`, appending it first unless already open.
    /// Returns its index.
    pub fn open(&self, tab: WorkspaceTab) -> usize {
        let mut group = self.group.write();
        let index = match group.tabs.iter().position(|t| *t == tab) {
            Some(index) => index,
            None => {
                tracing::debug!(tab = %tab, "Opened tab");
                group.tabs.push(tab.clone());
                group.tabs.len() - 1
            }
        };
        group.active = tab;
        index
    }

    pub fn activate(&self, tab: &WorkspaceTab) -> Result<()> {
        let mut group = self.group.write();
        if !tab.is_empty() && !group.tabs.contains(tab) {
            return Err(TabError::NotOpen(tab.to_string()));
        }
        group.active = tab.clone();
        Ok(())
    }

    /// Close every tab with this identity. When the active tab goes, the tab
    /// before it takes over, else the first remaining one, else `Empty`.
    pub fn close(&self, tab: &WorkspaceTab) -> bool {
        let mut group = self.group.write();
        let Some(first) = group.tabs.iter().position(|t| t == tab) else {
            return false;
        };
        group.tabs.retain(|t| t != tab);

        if group.active == *tab {
            let fallback = first
                .checked_sub(1)
                .and_then(|i| group.tabs.get(i))
                .or_else(|| group.tabs.first())
                .cloned()
                .unwrap_or(WorkspaceTab::Empty);
            group.active = fallback;
        }

        tracing::debug!(tab = %tab, active = %group.active, "Closed tab");
        true
    }

    /// Close the editor tab of `path`, e.g. after the file was deleted
    pub fn remove_editor_tab(&self, path: &str) -> bool {
        match WorkspaceTab::editor(path) {
            Ok(tab) => self.close(&tab),
            Err(_) => false,
        }
    }

    /// Move an open tab to `index`, clamped to the end
    pub fn move_tab(&self, tab: &WorkspaceTab, index: usize) -> Result<()> {
        let mut group = self.group.write();
        let from = group
            .tabs
            .iter()
            .position(|t| t == tab)
            .ok_or_else(|| TabError::NotOpen(tab.to_string()))?;
        let moved = group.tabs.remove(from);
        let index = index.min(group.tabs.len());
        group.tabs.insert(index, moved);
        Ok(())
    }

    /// Bring back the active tab from its key, opening it if needed
    pub fn restore_active(&self, key: &str) -> WorkspaceTab {
        let tab = WorkspaceTab::from_key(key);
        if tab.is_empty() {
            self.group.write().active = WorkspaceTab::Empty;
        } else {
            self.open(tab.clone());
        }
        tab
    }
}

impl Default for TabSessionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for TabSessionManager {
    fn clone(&self) -> Self {
        Self {
            group: Arc::clone(&self.group),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editor(path: &str) -> WorkspaceTab {
        WorkspaceTab::editor(path).unwrap()
    }

    #[test]
    fn test_open_twice_keeps_one_tab() {
        let manager = TabSessionManager::new();
        manager.open(editor("a.py"));
        manager.open(WorkspaceTab::Shell);
        manager.open(editor("a.py"));

        let editors = manager
            .tabs()
            .into_iter()
            .filter(|t| *t == editor("a.py"))
            .count();
        assert_eq!(editors, 1);
        assert_eq!(manager.active(), editor("a.py"));
        assert_eq!(manager.len(), 2);
    }

    #[test]
    fn test_close_active_falls_back_to_previous() {
        let manager = TabSessionManager::new();
        manager.open(editor("a.py"));
        manager.open(editor("b.py"));
        manager.open(editor("c.py"));
        manager.activate(&editor("b.py")).unwrap();

        assert!(manager.close(&editor("b.py")));
        assert_eq!(manager.active(), editor("a.py"));

        // First tab has no predecessor
        assert!(manager.close(&editor("a.py")));
        assert_eq!(manager.active(), editor("c.py"));

        assert!(manager.close(&editor("c.py")));
        assert_eq!(manager.active(), WorkspaceTab::Empty);
        assert_eq!(manager.active_key(), "empty");
    }

    #[test]
    fn test_close_inactive_keeps_active() {
        let manager = TabSessionManager::new();
        manager.open(WorkspaceTab::Instructions);
        manager.open(WorkspaceTab::Shell);

        assert!(manager.close(&WorkspaceTab::Instructions));
        assert_eq!(manager.active(), WorkspaceTab::Shell);
        assert!(!manager.close(&WorkspaceTab::Console));
    }

    #[test]
    fn test_close_removes_duplicates() {
        let manager = TabSessionManager::with_tabs(vec![
            editor("a.py"),
            WorkspaceTab::Shell,
            editor("a.py"),
        ]);
        assert_eq!(manager.len(), 3);

        assert!(manager.remove_editor_tab("a.py"));
        assert_eq!(manager.tabs(), vec![WorkspaceTab::Shell]);
        assert_eq!(manager.active(), WorkspaceTab::Shell);
    }

    #[test]
    fn test_remove_editor_tab_ignores_other_kinds() {
        let manager = TabSessionManager::with_tabs(vec![WorkspaceTab::Instructions]);
        assert!(!manager.remove_editor_tab("foo.txt"));
        assert!(!manager.remove_editor_tab(""));
        assert_eq!(manager.tabs(), vec![WorkspaceTab::Instructions]);
    }

    #[test]
    fn test_index_of_and_move() {
        let manager = TabSessionManager::with_tabs(vec![
            editor("a.py"),
            WorkspaceTab::Shell,
            WorkspaceTab::Console,
        ]);
        assert_eq!(manager.index_of(&editor("a.py")), Some(0));
        assert_eq!(manager.index_of(&editor("b.py")), None);

        manager.move_tab(&editor("a.py"), 10).unwrap();
        assert_eq!(manager.index_of(&editor("a.py")), Some(2));
        manager.move_tab(&WorkspaceTab::Console, 0).unwrap();
        assert_eq!(
            manager.tabs(),
            vec![WorkspaceTab::Console, WorkspaceTab::Shell, editor("a.py")]
        );

        assert!(manager.move_tab(&WorkspaceTab::Evaluation, 0).is_err());
    }

    #[test]
    fn test_activate_requires_open_tab() {
        let manager = TabSessionManager::new();
        assert!(matches!(
            manager.activate(&WorkspaceTab::Shell),
            Err(TabError::NotOpen(_))
        ));
        manager.activate(&WorkspaceTab::Empty).unwrap();
    }

    #[test]
    fn test_restore_active() {
        let manager = TabSessionManager::with_tabs(vec![WorkspaceTab::Instructions]);

        assert_eq!(manager.restore_active("/src/main.py"), editor("/src/main.py"));
        assert_eq!(manager.active_key(), "/src/main.py");
        assert_eq!(manager.len(), 2);

        manager.restore_active("instructions");
        assert_eq!(manager.active(), WorkspaceTab::Instructions);
        assert_eq!(manager.len(), 2);
    }

    #[test]
    fn test_clones_share_state() {
        let manager = TabSessionManager::new();
        let other = manager.clone();
        manager.open(WorkspaceTab::Console);
        assert_eq!(other.active(), WorkspaceTab::Console);
    }
}
