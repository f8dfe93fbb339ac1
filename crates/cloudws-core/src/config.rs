//! Workspace configuration

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use cloudws_route::{
    WorkspaceConfig, DEFAULT_BASE_URL_TEMPLATE, DEFAULT_COMPANION_IMAGE, DEFAULT_NAMESPACE,
};
use cloudws_session::Backoff;

use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Template of the companion URL, `{workspaceIdentifier}` is replaced
    pub base_url_template: String,
    /// Namespace route objects are created in
    pub namespace: String,
    pub companion_image: String,
    /// Command of the shell tab
    pub shell_command: Vec<String>,
    /// Command of the console tab
    pub run_command: Vec<String>,
    /// Coalescing window of editor auto-save
    pub autosave_window_ms: u64,
    pub probe_backoff: Backoff,
}

impl Config {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        tracing::info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    pub fn autosave_window(&self) -> Duration {
        Duration::from_millis(self.autosave_window_ms)
    }

    pub fn workspace_config(&self, workspace_id: impl Into<String>) -> WorkspaceConfig {
        WorkspaceConfig::new(workspace_id)
            .with_base_url_template(self.base_url_template.clone())
            .with_namespace(self.namespace.clone())
            .with_companion_image(self.companion_image.clone())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url_template: DEFAULT_BASE_URL_TEMPLATE.to_string(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            companion_image: DEFAULT_COMPANION_IMAGE.to_string(),
            shell_command: vec!["bash".to_string()],
            run_command: vec![
                "bash".to_string(),
                "-c".to_string(),
                "python main.py".to_string(),
            ],
            autosave_window_ms: 250,
            probe_backoff: Backoff::default(),
        }
    }
}
