//! Workspace provisioning configuration

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Placeholder in `base_url_template` replaced by the workspace id.
pub const WORKSPACE_ID_PLACEHOLDER: &str = "{workspaceIdentifier}";

pub const DEFAULT_NAMESPACE: &str = "default";
pub const DEFAULT_BASE_URL_TEMPLATE: &str = "http://localhost/{workspaceIdentifier}";
pub const DEFAULT_COMPANION_IMAGE: &str = "ghcr.io/codefreak/codefreak-cloud-companion:minimal";

/// Everything needed to expose one workspace companion.
///
/// Created once per requested session and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Random identifier of the workspace
    pub workspace_id: String,
    /// Template of the externally reachable URL, e.g.
    /// `https://example.com/ws/{workspaceIdentifier}` or
    /// `http://{workspaceIdentifier}.ws.example.com`
    pub base_url_template: String,
    /// Namespace the route object is created in
    pub namespace: String,
    /// Full image name of the companion
    pub companion_image: String,
    /// Extra labels attached to every generated object
    pub labels: BTreeMap<String, String>,
}

impl WorkspaceConfig {
    pub fn new(workspace_id: impl Into<String>) -> Self {
        Self {
            workspace_id: workspace_id.into(),
            base_url_template: DEFAULT_BASE_URL_TEMPLATE.to_string(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            companion_image: DEFAULT_COMPANION_IMAGE.to_string(),
            labels: BTreeMap::new(),
        }
    }

    pub fn with_base_url_template(mut self, template: impl Into<String>) -> Self {
        self.base_url_template = template.into();
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_companion_image(mut self, image: impl Into<String>) -> Self {
        self.companion_image = image.into();
        self
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// Template with the placeholder substituted
    pub fn resolved_base_url(&self) -> String {
        self.base_url_template
            .replace(WORKSPACE_ID_PLACEHOLDER, &self.workspace_id)
    }

    /// Name of the companion service the route points at
    pub fn companion_service_name(&self) -> String {
        format!("ws-{}-companion", self.workspace_id)
    }

    /// Name of the route object; one per workspace
    pub fn companion_route_name(&self) -> String {
        self.companion_service_name()
    }

    /// Labels for an object of the given component
    pub fn labels_for_component(&self, component: &str) -> BTreeMap<String, String> {
        let mut labels = self.labels.clone();
        labels.insert(
            "app.kubernetes.io/component".to_string(),
            component.to_string(),
        );
        labels.insert(
            "app.kubernetes.io/instance".to_string(),
            format!("ws-{}", self.workspace_id),
        );
        labels
    }
}
