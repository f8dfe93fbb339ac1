//! Process multiplexer
//!
//! Starts processes over the shared control channel and hands out terminal
//! attachments. Starting never queues: without an established control channel
//! it fails right away.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

use cloudws_session::SessionRegistry;

use crate::channel::{ControlChannel, GraphqlRequest, SubscriptionEvent};
use crate::error::ProcessError;
use crate::terminal::{TerminalConnector, TerminalStream, WsTerminalConnector};
use crate::Result;

pub const DEFAULT_SHELL_COMMAND: &[&str] = &["bash"];

const START_PROCESS: &str = "mutation StartProcess($cmd: [String!]!) {
  startProcess(cmd: $cmd) {
    id
  }
}";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessHandle {
    /// Opaque id assigned by the companion
    pub id: String,
    pub command: Vec<String>,
}

pub struct ProcessMultiplexer {
    registry: SessionRegistry,
    channel: Arc<RwLock<Option<Arc<dyn ControlChannel>>>>,
    connector: Arc<dyn TerminalConnector>,
    default_command: Vec<String>,
}

impl ProcessMultiplexer {
    pub fn new(registry: SessionRegistry) -> Self {
        Self::with_connector(registry, Arc::new(WsTerminalConnector))
    }

    pub fn with_connector(registry: SessionRegistry, connector: Arc<dyn TerminalConnector>) -> Self {
        Self {
            registry,
            channel: Arc::new(RwLock::new(None)),
            connector,
            default_command: DEFAULT_SHELL_COMMAND.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn with_default_command(mut self, command: Vec<String>) -> Self {
        self.default_command = command;
        self
    }

    pub fn default_command(&self) -> &[String] {
        &self.default_command
    }

    /// Install the session's control channel
    pub fn set_channel(&self, channel: Arc<dyn ControlChannel>) {
        *self.channel.write() = Some(channel);
        tracing::debug!(base_url = %self.registry.base_url(), "Control channel installed");
    }

    pub fn clear_channel(&self) {
        self.channel.write().take();
    }

    pub fn is_ready(&self) -> bool {
        self.channel.read().is_some()
    }

    /// Start a process, `None` runs the default shell
    pub async fn start(&self, command: Option<Vec<String>>) -> Result<ProcessHandle> {
        let command = command.unwrap_or_else(|| self.default_command.clone());
        let channel = self.channel.read().clone().ok_or(ProcessError::NotReady)?;

        let request = GraphqlRequest {
            query: START_PROCESS.to_string(),
            variables: Some(json!({ "cmd": command })),
            operation_name: Some("StartProcess".to_string()),
        };
        let mut events = channel.subscribe(request).await?;

        let mut process_id: Option<String> = None;
        let mut errors: Vec<String> = Vec::new();
        loop {
            match events.recv().await {
                Some(SubscriptionEvent::Next(payload)) => {
                    if let Some(id) = payload
                        .pointer("/data/startProcess/id")
                        .and_then(Value::as_str)
                    {
                        process_id = Some(id.to_string());
                    }
                    errors.extend(graphql_errors(&payload));
                }
                Some(SubscriptionEvent::Error(message)) => {
                    tracing::warn!(command = ?command, error = %message, "Process start failed");
                    return Err(ProcessError::Protocol(message));
                }
                Some(SubscriptionEvent::Complete) => break,
                None => {
                    return Err(ProcessError::Protocol(
                        "control channel closed before the exchange completed".to_string(),
                    ));
                }
            }
        }

        match process_id {
            Some(id) => {
                tracing::info!(process_id = %id, command = ?command, "Started process");
                Ok(ProcessHandle { id, command })
            }
            None if !errors.is_empty() => Err(ProcessError::Protocol(errors.join("; "))),
            None => Err(ProcessError::NoProcessId),
        }
    }

    /// Open a terminal channel to a process. Attachments are not exclusive.
    pub async fn attach(&self, process_id: &str) -> Result<TerminalStream> {
        let url = self.registry.terminal_url(process_id)?;
        self.connector.connect(process_id, &url).await
    }
}

fn graphql_errors(payload: &Value) -> Vec<String> {
    payload["errors"]
        .as_array()
        .map(|errors| {
            errors
                .iter()
                .filter_map(|e| e["message"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

impl Clone for ProcessMultiplexer {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
            channel: Arc::clone(&self.channel),
            connector: Arc::clone(&self.connector),
            default_command: self.default_command.clone(),
        }
    }
}
