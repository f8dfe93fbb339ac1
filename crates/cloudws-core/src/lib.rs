//! cloudws Core
//!
//! Entry point for a workspace page session: provisioning turns a workspace
//! id into a companion route and base URL, and a [`Workspace`] ties the
//! session registry, processes, file tree and tabs to that base URL.

mod config;
mod error;
mod notice;
mod provisioner;
mod workspace;

pub use config::Config;
pub use error::{CoreError, ErrorKind};
pub use notice::{Notice, NoticeQueue};
pub use provisioner::{ProvisionedWorkspace, Provisioner};
pub use workspace::Workspace;

// Re-export core components
pub use cloudws_files::{
    AutoSaver, DeleteConfirmation, FileApi, FileError, FileSystemNode, FileTreeNode,
    FileTreeSynchronizer, HttpFileApi, PathKind, SaveState,
};
pub use cloudws_process::{
    ControlChannel, GraphqlWsChannel, ProcessError, ProcessHandle, ProcessMultiplexer,
    ProcessSlot, SlotStatus, TerminalConnector, TerminalStream,
};
pub use cloudws_route::{
    ApplyOutcome, CompanionRoute, RouteError, RouteGenerator, RouteStore, WorkspaceConfig,
};
pub use cloudws_session::{Availability, Backoff, SessionError, SessionRegistry};
pub use cloudws_tabs::{
    TabError, TabKind, TabLayout, TabRenderer, TabSessionManager, TitleRenderer, WorkspaceTab,
};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).init();
}
