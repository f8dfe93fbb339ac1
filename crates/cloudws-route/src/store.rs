//! Route store
//!
//! Applied routes keyed by workspace id. Applying is an upsert so that
//! re-provisioning a workspace replaces its route object.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::RouteError;
use crate::generator::RouteGenerator;
use crate::route::CompanionRoute;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Created,
    Replaced,
}

#[derive(Debug, Clone)]
struct AppliedRoute {
    route: CompanionRoute,
    applied_at: DateTime<Utc>,
}

pub struct RouteStore {
    routes: Arc<RwLock<HashMap<String, AppliedRoute>>>,
}

impl RouteStore {
    pub fn new() -> Self {
        Self {
            routes: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Generate and apply the route for a workspace
    pub fn apply(&self, generator: &RouteGenerator) -> ApplyOutcome {
        let route = generator.route();
        let workspace_id = generator.workspace_id().to_string();

        let previous = self.routes.write().insert(
            workspace_id.clone(),
            AppliedRoute {
                route,
                applied_at: Utc::now(),
            },
        );

        let outcome = if previous.is_some() {
            ApplyOutcome::Replaced
        } else {
            ApplyOutcome::Created
        };

        tracing::info!(
            workspace_id = %workspace_id,
            outcome = ?outcome,
            "Applied companion route"
        );

        outcome
    }

    pub fn get(&self, workspace_id: &str) -> Result<CompanionRoute> {
        self.routes
            .read()
            .get(workspace_id)
            .map(|applied| applied.route.clone())
            .ok_or_else(|| RouteError::NotFound(workspace_id.to_string()))
    }

    pub fn applied_at(&self, workspace_id: &str) -> Option<DateTime<Utc>> {
        self.routes
            .read()
            .get(workspace_id)
            .map(|applied| applied.applied_at)
    }

    /// Tear down the route of a workspace
    pub fn remove(&self, workspace_id: &str) -> Result<CompanionRoute> {
        let removed = self
            .routes
            .write()
            .remove(workspace_id)
            .ok_or_else(|| RouteError::NotFound(workspace_id.to_string()))?;

        tracing::info!(workspace_id = %workspace_id, "Removed companion route");

        Ok(removed.route)
    }

    pub fn list(&self) -> Vec<CompanionRoute> {
        let mut routes: Vec<CompanionRoute> = self
            .routes
            .read()
            .values()
            .map(|applied| applied.route.clone())
            .collect();
        routes.sort_by(|a, b| a.metadata.name.cmp(&b.metadata.name));
        routes
    }

    pub fn len(&self) -> usize {
        self.routes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.read().is_empty()
    }
}

impl Default for RouteStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for RouteStore {
    fn clone(&self) -> Self {
        Self {
            routes: Arc::clone(&self.routes),
        }
    }
}
