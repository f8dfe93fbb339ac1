//! Workspace provisioning
//!
//! Turns a workspace id into an applied companion route and the base URL
//! clients use to reach it.

use serde::Serialize;

use cloudws_route::{ApplyOutcome, CompanionRoute, RouteGenerator, RouteStore};

use crate::config::Config;
use crate::Result;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionedWorkspace {
    pub workspace_id: String,
    /// Always ends with `/`
    pub base_url: String,
    pub route: CompanionRoute,
    #[serde(skip)]
    pub outcome: ApplyOutcome,
}

pub struct Provisioner {
    config: Config,
    routes: RouteStore,
}

impl Provisioner {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            routes: RouteStore::new(),
        }
    }

    pub fn routes(&self) -> &RouteStore {
        &self.routes
    }

    /// Create or replace the route of a workspace
    pub fn provision(&self, workspace_id: &str) -> Result<ProvisionedWorkspace> {
        let generator = RouteGenerator::new(self.config.workspace_config(workspace_id))?;
        let outcome = self.routes.apply(&generator);

        tracing::info!(
            workspace_id = %workspace_id,
            base_url = %generator.base_url(),
            "Provisioned workspace"
        );

        Ok(ProvisionedWorkspace {
            workspace_id: workspace_id.to_string(),
            base_url: generator.base_url(),
            route: generator.route(),
            outcome,
        })
    }

    pub fn teardown(&self, workspace_id: &str) -> Result<CompanionRoute> {
        let route = self.routes.remove(workspace_id)?;
        tracing::info!(workspace_id = %workspace_id, "Tore down workspace");
        Ok(route)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CoreError, ErrorKind};

    fn provisioner() -> Provisioner {
        Provisioner::new(Config {
            base_url_template: "https://ws.example.com/{workspaceIdentifier}".to_string(),
            ..Config::default()
        })
    }

    #[test]
    fn test_reprovision_replaces() {
        let provisioner = provisioner();
        let first = provisioner.provision("abc").unwrap();
        let second = provisioner.provision("abc").unwrap();

        assert_eq!(first.outcome, ApplyOutcome::Created);
        assert_eq!(second.outcome, ApplyOutcome::Replaced);
        assert_eq!(provisioner.routes().len(), 1);
        assert!(first.base_url.ends_with('/'));
        assert_eq!(first.base_url, second.base_url);
    }

    #[test]
    fn test_invalid_workspace_id() {
        let err = provisioner().provision("").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_teardown() {
        let provisioner = provisioner();
        provisioner.provision("abc").unwrap();
        provisioner.teardown("abc").unwrap();

        assert!(provisioner.routes().is_empty());
        assert!(matches!(
            provisioner.teardown("abc"),
            Err(CoreError::Route(_))
        ));
    }
}
