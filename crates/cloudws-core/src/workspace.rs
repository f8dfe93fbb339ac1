//! Workspace session context
//!
//! One `Workspace` per page session. It owns the session registry and every
//! component built on it; nothing here is global. Failed actions are returned
//! to the caller and also queued as notices.

use std::sync::Arc;

use cloudws_files::{
    absolute_path, AutoSaver, DeleteConfirmation, FileApi, FileTreeNode, FileTreeSynchronizer,
    HttpFileApi, PathKind,
};
use cloudws_process::{
    GraphqlWsChannel, ProcessMultiplexer, ProcessSlot, SlotStatus, TerminalStream,
};
use cloudws_session::SessionRegistry;
use cloudws_tabs::{TabLayout, WorkspaceTab};

use crate::config::Config;
use crate::error::CoreError;
use crate::notice::NoticeQueue;
use crate::Result;

pub struct Workspace {
    config: Config,
    client: reqwest::Client,
    registry: SessionRegistry,
    processes: ProcessMultiplexer,
    file_api: Arc<dyn FileApi>,
    files: FileTreeSynchronizer,
    tabs: TabLayout,
    /// Process behind the shell tab
    shell: ProcessSlot,
    /// Process behind the console tab
    console: ProcessSlot,
    notices: NoticeQueue,
}

impl Workspace {
    /// Session bound to the companion at `base_url`
    pub fn new(config: Config, base_url: &str) -> Result<Self> {
        let client = reqwest::Client::new();
        let registry = SessionRegistry::new(base_url)?;
        let processes = ProcessMultiplexer::new(registry.clone())
            .with_default_command(config.shell_command.clone());
        let file_api = Arc::new(HttpFileApi::new(client.clone(), registry.clone()));

        Ok(Self::with_services(config, client, registry, processes, file_api))
    }

    pub fn with_services(
        config: Config,
        client: reqwest::Client,
        registry: SessionRegistry,
        processes: ProcessMultiplexer,
        file_api: Arc<dyn FileApi>,
    ) -> Self {
        let files = FileTreeSynchronizer::new(Arc::clone(&file_api));
        let shell = ProcessSlot::with_command(config.shell_command.clone());
        let console = ProcessSlot::with_command(config.run_command.clone());
        let tabs = TabLayout::new(vec![WorkspaceTab::Instructions], vec![WorkspaceTab::Shell]);

        tracing::info!(base_url = %registry.base_url(), "Workspace session created");

        Self {
            config,
            client,
            registry,
            processes,
            file_api,
            files,
            tabs,
            shell,
            console,
            notices: NoticeQueue::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn processes(&self) -> &ProcessMultiplexer {
        &self.processes
    }

    pub fn files(&self) -> &FileTreeSynchronizer {
        &self.files
    }

    pub fn tabs(&self) -> &TabLayout {
        &self.tabs
    }

    pub fn notices(&self) -> &NoticeQueue {
        &self.notices
    }

    fn report<T, E: Into<CoreError>>(
        &self,
        action: &str,
        result: std::result::Result<T, E>,
    ) -> Result<T> {
        result.map_err(|e| {
            let err = e.into();
            self.notices.push(action, &err);
            err
        })
    }

    /// Block until the companion answers; retries forever
    pub async fn wait_until_available(&self) {
        self.registry
            .probe_until_available(&self.client, self.config.probe_backoff)
            .await;
    }

    pub async fn connect_control_channel(&self) -> Result<()> {
        let channel = GraphqlWsChannel::connect(self.registry.control_url()).await;
        let channel = self.report("connect control channel", channel)?;
        self.processes.set_channel(Arc::new(channel));
        Ok(())
    }

    async fn attach_slot(&self, slot: &ProcessSlot, action: &str) -> Result<Option<TerminalStream>> {
        let status = slot.ensure_started(&self.processes).await;
        match self.report(action, status)? {
            SlotStatus::Ready(id) => {
                let stream = self.processes.attach(&id).await;
                Ok(Some(self.report(action, stream)?))
            }
            SlotStatus::InFlight => Ok(None),
        }
    }

    /// Show the shell tab and attach to its process.
    /// `None` while another caller's start is still in flight.
    pub async fn open_shell(&self) -> Result<Option<TerminalStream>> {
        self.tabs.right.open(WorkspaceTab::Shell);
        self.attach_slot(&self.shell, "start shell").await
    }

    /// Show the console tab and attach to the run process
    pub async fn run(&self) -> Result<Option<TerminalStream>> {
        self.tabs.right.open(WorkspaceTab::Console);
        self.attach_slot(&self.console, "run").await
    }

    /// Show an editor tab for `path` and fetch its contents.
    /// Editor tabs are keyed by the absolute tree path.
    pub async fn open_file(&self, path: &str) -> Result<Vec<u8>> {
        let tab = WorkspaceTab::editor(absolute_path(path));
        let tab = self.report(&format!("open {}", path), tab)?;
        self.tabs.left.open(tab);
        let contents = self.file_api.read_file(path).await;
        self.report(&format!("open {}", path), contents)
    }

    /// Auto-saver for an open editor; the path is relative to the files route
    pub fn autosaver(&self, path: &str) -> AutoSaver {
        AutoSaver::new(
            Arc::clone(&self.file_api),
            path.trim_start_matches('/'),
            self.config.autosave_window(),
        )
    }

    pub async fn load_directory(&self, path: &str) -> Result<Arc<Vec<FileTreeNode>>> {
        let tree = self.files.load(path).await;
        self.report(&format!("list {}", path), tree)
    }

    pub async fn create_path(&self, path: &str, kind: PathKind) -> Result<Arc<Vec<FileTreeNode>>> {
        let tree = self.files.create(path, kind).await;
        self.report(&format!("create {}", path), tree)
    }

    pub fn request_delete(&self, path: &str) -> DeleteConfirmation {
        self.files.request_delete(path)
    }

    /// Delete a confirmed path and close editor tabs showing it
    pub async fn confirm_delete(
        &self,
        confirmation: DeleteConfirmation,
    ) -> Result<Arc<Vec<FileTreeNode>>> {
        let path = confirmation.path().to_string();
        let tree = self.files.confirm_delete(confirmation).await;
        let tree = self.report(&format!("delete {}", path), tree)?;

        let path = absolute_path(&path);
        self.tabs.left.remove_editor_tab(&path);
        self.tabs.right.remove_editor_tab(&path);
        Ok(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use async_trait::async_trait;
    use cloudws_process::{
        ControlChannel, GraphqlRequest, SubscriptionEvent, TerminalConnector,
    };
    use parking_lot::Mutex;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::mpsc;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Default)]
    struct CountingChannel {
        starts: AtomicUsize,
        commands: Mutex<Vec<serde_json::Value>>,
    }

    #[async_trait]
    impl ControlChannel for CountingChannel {
        async fn subscribe(
            &self,
            request: GraphqlRequest,
        ) -> cloudws_process::Result<mpsc::Receiver<SubscriptionEvent>> {
            let n = self.starts.fetch_add(1, Ordering::SeqCst) + 1;
            self.commands
                .lock()
                .push(request.variables.unwrap_or_default()["cmd"].clone());

            let (tx, rx) = mpsc::channel(2);
            tx.send(SubscriptionEvent::Next(
                json!({ "data": { "startProcess": { "id": format!("proc-{}", n) } } }),
            ))
            .await
            .unwrap();
            tx.send(SubscriptionEvent::Complete).await.unwrap();
            Ok(rx)
        }
    }

    #[derive(Default)]
    struct NullConnector {
        attached: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl TerminalConnector for NullConnector {
        async fn connect(
            &self,
            process_id: &str,
            url: &str,
        ) -> cloudws_process::Result<TerminalStream> {
            self.attached.lock().push(url.to_string());
            let (input, _) = mpsc::channel(1);
            let (_, output) = mpsc::channel(1);
            Ok(TerminalStream::new(process_id, url, input, output, None))
        }
    }

    fn workspace(base_url: &str) -> (Workspace, Arc<NullConnector>) {
        let config = Config::default();
        let registry = SessionRegistry::new(base_url).unwrap();
        let connector = Arc::new(NullConnector::default());
        let processes = ProcessMultiplexer::with_connector(registry.clone(), connector.clone())
            .with_default_command(config.shell_command.clone());
        let client = reqwest::Client::new();
        let file_api = Arc::new(HttpFileApi::new(client.clone(), registry.clone()));
        (
            Workspace::with_services(config, client, registry, processes, file_api),
            connector,
        )
    }

    #[tokio::test]
    async fn test_shell_starts_once() {
        let (ws, connector) = workspace("https://example.com/ws-abc/");
        let channel = Arc::new(CountingChannel::default());
        ws.processes().set_channel(channel.clone());

        let first = ws.open_shell().await.unwrap().unwrap();
        let second = ws.open_shell().await.unwrap().unwrap();

        assert_eq!(first.process_id(), "proc-1");
        assert_eq!(second.process_id(), "proc-1");
        assert_eq!(channel.starts.load(Ordering::SeqCst), 1);
        assert_eq!(
            *connector.attached.lock(),
            vec![
                "wss://example.com/ws-abc/process/proc-1".to_string(),
                "wss://example.com/ws-abc/process/proc-1".to_string(),
            ]
        );
        assert_eq!(ws.tabs().right.active(), WorkspaceTab::Shell);
    }

    #[tokio::test]
    async fn test_run_uses_run_command() {
        let (ws, _) = workspace("https://example.com/ws-abc/");
        let channel = Arc::new(CountingChannel::default());
        ws.processes().set_channel(channel.clone());

        ws.open_shell().await.unwrap();
        let console = ws.run().await.unwrap().unwrap();

        assert_eq!(console.process_id(), "proc-2");
        assert_eq!(
            channel.commands.lock()[1],
            json!(["bash", "-c", "python main.py"])
        );
        assert_eq!(ws.tabs().right.active(), WorkspaceTab::Console);
    }

    #[tokio::test]
    async fn test_not_ready_becomes_notice() {
        let (ws, _) = workspace("https://example.com/ws-abc/");

        let err = ws.open_shell().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotReady);
        assert_eq!(ws.shell.state(), cloudws_process::StartState::Unstarted);

        let notices = ws.notices().list();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].action, "start shell");
        assert_eq!(notices[0].message, "Process error: Control channel is not ready yet");
    }

    #[tokio::test]
    async fn test_open_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ws-abc/files/main.py"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"print(1)".to_vec()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .with_priority(10)
            .mount(&server)
            .await;

        let (ws, _) = workspace(&format!("{}/ws-abc", server.uri()));

        assert_eq!(ws.open_file("main.py").await.unwrap(), b"print(1)".to_vec());
        assert_eq!(ws.tabs().left.active_key(), "/main.py");
        ws.open_file("/main.py").await.unwrap();
        assert_eq!(ws.tabs().left.len(), 2);

        let err = ws.open_file("missing.py").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(ws.notices().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_closes_editor_tab() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ws-abc/files/main.py"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"x".to_vec()))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/ws-abc/files/main.py"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/ws-abc/graphql"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "listFiles": [{ "path": "/README.md", "size": 3 }] }
            })))
            .mount(&server)
            .await;

        let (ws, _) = workspace(&format!("{}/ws-abc", server.uri()));
        ws.open_file("main.py").await.unwrap();

        let confirmation = ws.request_delete("/main.py");
        let tree = ws.confirm_delete(confirmation).await.unwrap();

        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].path, "/README.md");
        assert!(!ws.tabs().left.contains(&WorkspaceTab::editor("/main.py").unwrap()));
        assert_eq!(ws.tabs().left.active(), WorkspaceTab::Instructions);
    }

    #[tokio::test]
    async fn test_control_channel_failure_is_reported() {
        let (ws, _) = workspace("http://127.0.0.1:9/ws-abc/");

        let err = ws.connect_control_channel().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Protocol);
        assert!(!ws.processes().is_ready());
        assert_eq!(ws.notices().list()[0].action, "connect control channel");
    }
}
