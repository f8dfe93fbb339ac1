//! Left and right pane of a workspace page

use std::collections::BTreeMap;

use crate::manager::TabSessionManager;
use crate::tab::WorkspaceTab;

pub const LEFT_TAB_QUERY_PARAM: &str = "leftTab";
pub const RIGHT_TAB_QUERY_PARAM: &str = "rightTab";

#[derive(Clone, Default)]
pub struct TabLayout {
    pub left: TabSessionManager,
    pub right: TabSessionManager,
}

impl TabLayout {
    pub fn new(left: Vec<WorkspaceTab>, right: Vec<WorkspaceTab>) -> Self {
        Self {
            left: TabSessionManager::with_tabs(left),
            right: TabSessionManager::with_tabs(right),
        }
    }

    /// Active tab keys by query parameter
    pub fn query_params(&self) -> BTreeMap<&'static str, String> {
        BTreeMap::from([
            (LEFT_TAB_QUERY_PARAM, self.left.active_key()),
            (RIGHT_TAB_QUERY_PARAM, self.right.active_key()),
        ])
    }

    /// Restore both panes; a missing parameter leaves its pane alone
    pub fn restore<'a>(&self, mut param: impl FnMut(&str) -> Option<&'a str>) {
        if let Some(key) = param(LEFT_TAB_QUERY_PARAM) {
            self.left.restore_active(key);
        }
        if let Some(key) = param(RIGHT_TAB_QUERY_PARAM) {
            self.right.restore_active(key);
        }
    }
}
