//! Route generation
//!
//! All addresses of a workspace are derived from the same resolved base URL so
//! the ingress and the client always agree on host, port and path prefix.

use std::collections::BTreeMap;
use url::Url;

use crate::config::WorkspaceConfig;
use crate::error::RouteError;
use crate::route::{
    BackendPort, CompanionRoute, HttpPath, IngressBackend, IngressRule, RouteMetadata, RouteSpec,
    BODY_SIZE_ANNOTATION, REWRITE_TARGET_ANNOTATION, ROUTE_API_VERSION, ROUTE_KIND,
    USE_REGEX_ANNOTATION,
};
use crate::Result;

/// Rewrite target handed to the ingress controller: the second capture group
pub const REWRITE_TARGET: &str = "/$2";
/// Request body cap for the file API
pub const MAX_BODY_SIZE: &str = "10m";
/// Named port of the companion's HTTP endpoint
pub const COMPANION_HTTP_PORT: &str = "http";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRule {
    pub hostname: String,
    /// No leading or trailing slash
    pub base_path: String,
    pub rewrite_target: String,
}

#[derive(Debug, Clone)]
pub struct RouteGenerator {
    config: WorkspaceConfig,
    base_url: Url,
    base_path: String,
}

impl RouteGenerator {
    pub fn new(config: WorkspaceConfig) -> Result<Self> {
        validate_workspace_id(&config.workspace_id)?;

        let base_url = Url::parse(&config.resolved_base_url())?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(RouteError::Configuration(format!(
                "Base URL must use http or https, got '{}'",
                base_url.scheme()
            )));
        }
        if base_url.host_str().map_or(true, str::is_empty) {
            return Err(RouteError::Configuration(
                "Base URL has no host".to_string(),
            ));
        }

        let base_path = derive_base_path(base_url.path(), &config.workspace_id);
        if base_path.is_empty() {
            return Err(RouteError::Configuration(
                "Computed base path is empty".to_string(),
            ));
        }

        tracing::debug!(
            workspace_id = %config.workspace_id,
            base_path = %base_path,
            "Derived companion base path"
        );

        Ok(Self {
            config,
            base_url,
            base_path,
        })
    }

    pub fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    pub fn workspace_id(&self) -> &str {
        &self.config.workspace_id
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn hostname(&self) -> &str {
        // Checked in `new`
        self.base_url.host_str().unwrap_or_default()
    }

    /// Host with the port appended unless it is the scheme's default
    fn hostname_with_port(&self) -> String {
        match self.base_url.port() {
            Some(port) => format!("{}:{}", self.hostname(), port),
            None => self.hostname().to_string(),
        }
    }

    /// `scheme://host[:port]/basePath/`
    pub fn base_url(&self) -> String {
        format!(
            "{}://{}/{}/",
            self.base_url.scheme(),
            self.hostname_with_port(),
            self.base_path
        )
    }

    /// Path regex the ingress matches requests against
    pub fn path_pattern(&self) -> String {
        format!("/{}(/|$)(.*)", self.base_path)
    }

    pub fn rule(&self) -> RouteRule {
        RouteRule {
            hostname: self.hostname().to_string(),
            base_path: self.base_path.clone(),
            rewrite_target: REWRITE_TARGET.to_string(),
        }
    }

    /// Emit the declarative route object exposing the companion
    pub fn route(&self) -> CompanionRoute {
        let mut annotations = BTreeMap::new();
        annotations.insert(
            REWRITE_TARGET_ANNOTATION.to_string(),
            REWRITE_TARGET.to_string(),
        );
        annotations.insert(BODY_SIZE_ANNOTATION.to_string(), MAX_BODY_SIZE.to_string());
        annotations.insert(USE_REGEX_ANNOTATION.to_string(), "true".to_string());

        CompanionRoute {
            api_version: ROUTE_API_VERSION.to_string(),
            kind: ROUTE_KIND.to_string(),
            metadata: RouteMetadata {
                name: self.config.companion_route_name(),
                namespace: self.config.namespace.clone(),
                labels: self.config.labels_for_component("companion"),
                annotations,
            },
            spec: RouteSpec {
                rules: vec![IngressRule {
                    host: self.hostname().to_string(),
                    paths: vec![HttpPath {
                        path_type: "Prefix".to_string(),
                        path: self.path_pattern(),
                        backend: IngressBackend {
                            service_name: self.config.companion_service_name(),
                            port: BackendPort {
                                name: COMPANION_HTTP_PORT.to_string(),
                            },
                        },
                    }],
                }],
            },
        }
    }
}

fn validate_workspace_id(workspace_id: &str) -> Result<()> {
    if workspace_id.trim().is_empty() {
        return Err(RouteError::Configuration(
            "Workspace id cannot be empty".to_string(),
        ));
    }
    if workspace_id.contains(['/', '{', '}']) || workspace_id.contains(char::is_whitespace) {
        return Err(RouteError::Configuration(format!(
            "Workspace id contains invalid characters: '{}'",
            workspace_id
        )));
    }
    Ok(())
}

fn derive_base_path(url_path: &str, workspace_id: &str) -> String {
    let prefix = url_path.trim_matches('/');
    let path = if prefix.is_empty() {
        format!("ws-{}", workspace_id)
    } else {
        format!("{}/ws-{}", prefix, workspace_id)
    };
    path.trim_matches('/').to_string()
}
