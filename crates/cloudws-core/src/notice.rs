//! Inline notifications for failed workspace actions

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;

use crate::error::{CoreError, ErrorKind};

const MAX_NOTICES: usize = 50;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notice {
    /// What was attempted, e.g. `delete /main.py`
    pub action: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Bounded queue, oldest notices are dropped first
pub struct NoticeQueue {
    notices: Arc<RwLock<VecDeque<Notice>>>,
}

impl NoticeQueue {
    pub fn new() -> Self {
        Self {
            notices: Arc::new(RwLock::new(VecDeque::new())),
        }
    }

    pub fn push(&self, action: impl Into<String>, error: &CoreError) {
        let notice = Notice {
            action: action.into(),
            message: error.to_string(),
            created_at: Utc::now(),
        };
        match error.kind() {
            ErrorKind::Protocol => {
                tracing::warn!(action = %notice.action, error = %notice.message, "Workspace action failed")
            }
            _ => {
                tracing::info!(action = %notice.action, error = %notice.message, "Workspace action rejected")
            }
        }

        let mut notices = self.notices.write();
        if notices.len() == MAX_NOTICES {
            notices.pop_front();
        }
        notices.push_back(notice);
    }

    pub fn list(&self) -> Vec<Notice> {
        self.notices.read().iter().cloned().collect()
    }

    /// Take all notices, leaving the queue empty
    pub fn drain(&self) -> Vec<Notice> {
        self.notices.write().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.notices.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.notices.read().is_empty()
    }
}

impl Default for NoticeQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for NoticeQueue {
    fn clone(&self) -> Self {
        Self {
            notices: Arc::clone(&self.notices),
        }
    }
}
