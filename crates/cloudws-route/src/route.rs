//! Declarative route object exposing a companion
//!
//! Shaped like a `networking.k8s.io/v1` Ingress so it can be applied as-is.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const ROUTE_API_VERSION: &str = "networking.k8s.io/v1";
pub const ROUTE_KIND: &str = "Ingress";
pub const REWRITE_TARGET_ANNOTATION: &str = "nginx.ingress.kubernetes.io/rewrite-target";
pub const BODY_SIZE_ANNOTATION: &str = "nginx.ingress.kubernetes.io/proxy-body-size";
pub const USE_REGEX_ANNOTATION: &str = "nginx.ingress.kubernetes.io/use-regex";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanionRoute {
    pub api_version: String,
    pub kind: String,
    pub metadata: RouteMetadata,
    pub spec: RouteSpec,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteMetadata {
    pub name: String,
    pub namespace: String,
    pub labels: BTreeMap<String, String>,
    pub annotations: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSpec {
    pub rules: Vec<IngressRule>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngressRule {
    pub host: String,
    pub paths: Vec<HttpPath>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpPath {
    pub path_type: String,
    pub path: String,
    pub backend: IngressBackend,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngressBackend {
    pub service_name: String,
    pub port: BackendPort,
}

/// Ports are referenced by name so the companion may move them freely
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendPort {
    pub name: String,
}

impl CompanionRoute {
    /// Workspace id this route was generated for
    pub fn workspace_id(&self) -> Option<&str> {
        self.metadata
            .labels
            .get("app.kubernetes.io/instance")
            .and_then(|instance| instance.strip_prefix("ws-"))
    }

    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
