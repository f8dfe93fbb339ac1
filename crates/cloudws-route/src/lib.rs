//! cloudws Route Generation
//!
//! Derives the externally reachable address of a workspace companion and
//! emits the declarative route object that exposes it:
//! - `basePath` = `{template path}/ws-{workspaceId}`, trimmed of slashes
//! - requests under `/{basePath}(/|$)(.*)` are rewritten to `/$2`
//! - re-provisioning a workspace replaces its route, never duplicates it

mod config;
mod error;
mod generator;
mod route;
mod store;

pub use config::{
    WorkspaceConfig, DEFAULT_BASE_URL_TEMPLATE, DEFAULT_COMPANION_IMAGE, DEFAULT_NAMESPACE,
    WORKSPACE_ID_PLACEHOLDER,
};
pub use error::RouteError;
pub use generator::{RouteGenerator, RouteRule};
pub use route::{
    BackendPort, CompanionRoute, HttpPath, IngressBackend, IngressRule, RouteMetadata, RouteSpec,
};
pub use store::{ApplyOutcome, RouteStore};

pub type Result<T> = std::result::Result<T, RouteError>;
