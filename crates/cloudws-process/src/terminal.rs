//! Terminal channels
//!
//! Each attachment owns one raw bidirectional stream. Dropping the
//! `TerminalStream` tears its channel down.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use crate::error::ProcessError;
use crate::Result;

const TERMINAL_BUFFER: usize = 256;

pub struct TerminalStream {
    process_id: String,
    url: String,
    input: mpsc::Sender<Vec<u8>>,
    output: mpsc::Receiver<Vec<u8>>,
    pump: Option<JoinHandle<()>>,
}

impl TerminalStream {
    /// Wrap channel ends; `pump` is aborted when the stream is dropped
    pub fn new(
        process_id: impl Into<String>,
        url: impl Into<String>,
        input: mpsc::Sender<Vec<u8>>,
        output: mpsc::Receiver<Vec<u8>>,
        pump: Option<JoinHandle<()>>,
    ) -> Self {
        Self {
            process_id: process_id.into(),
            url: url.into(),
            input,
            output,
            pump,
        }
    }

    pub fn process_id(&self) -> &str {
        &self.process_id
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send keystrokes to the process
    pub async fn send(&self, bytes: impl Into<Vec<u8>>) -> Result<()> {
        self.input
            .send(bytes.into())
            .await
            .map_err(|_| ProcessError::Protocol("terminal channel closed".to_string()))
    }

    /// Next chunk of process output, `None` once the channel is closed
    pub async fn recv(&mut self) -> Option<Vec<u8>> {
        self.output.recv().await
    }

    pub fn is_closed(&self) -> bool {
        self.input.is_closed()
    }
}

impl std::fmt::Debug for TerminalStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalStream")
            .field("process_id", &self.process_id)
            .field("url", &self.url)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

impl Drop for TerminalStream {
    fn drop(&mut self) {
        if let Some(pump) = self.pump.take() {
            pump.abort();
            tracing::debug!(process_id = %self.process_id, "Detached terminal");
        }
    }
}

/// Opens terminal channels by URL
#[async_trait]
pub trait TerminalConnector: Send + Sync {
    async fn connect(&self, process_id: &str, url: &str) -> Result<TerminalStream>;
}

/// Terminal channels over plain websockets
#[derive(Debug, Clone, Default)]
pub struct WsTerminalConnector;

#[async_trait]
impl TerminalConnector for WsTerminalConnector {
    async fn connect(&self, process_id: &str, url: &str) -> Result<TerminalStream> {
        let (ws, _) = connect_async(url).await?;
        let (mut ws_tx, mut ws_rx) = ws.split();

        let (input_tx, mut input_rx) = mpsc::channel::<Vec<u8>>(TERMINAL_BUFFER);
        let (output_tx, output_rx) = mpsc::channel::<Vec<u8>>(TERMINAL_BUFFER);

        let pump_id = process_id.to_string();
        let pump = tokio::spawn(async move {
            loop {
                tokio::select! {
                    input = input_rx.recv() => {
                        let Some(bytes) = input else { break };
                        if ws_tx.send(Message::Binary(bytes.into())).await.is_err() {
                            break;
                        }
                    }
                    msg = ws_rx.next() => {
                        let bytes = match msg {
                            Some(Ok(Message::Binary(bytes))) => bytes.to_vec(),
                            Some(Ok(Message::Text(text))) => text.as_bytes().to_vec(),
                            Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                            Some(Ok(_)) => continue,
                        };
                        if output_tx.send(bytes).await.is_err() {
                            break;
                        }
                    }
                }
            }
            let _ = ws_tx.close().await;
            tracing::debug!(process_id = %pump_id, "Terminal channel closed");
        });

        tracing::info!(process_id = %process_id, url = %url, "Attached terminal");

        Ok(TerminalStream::new(
            process_id,
            url,
            input_tx,
            output_rx,
            Some(pump),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    /// Echo server standing in for a process terminal
    async fn spawn_echo() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
                    while let Some(Ok(msg)) = ws.next().await {
                        if msg.is_binary() && ws.send(msg).await.is_err() {
                            break;
                        }
                    }
                });
            }
        });

        format!("ws://{}/process/p1", addr)
    }

    #[tokio::test]
    async fn test_terminal_round_trip() {
        let url = spawn_echo().await;
        let mut terminal = WsTerminalConnector.connect("p1", &url).await.unwrap();

        terminal.send(b"ls\n".to_vec()).await.unwrap();
        assert_eq!(terminal.recv().await.unwrap(), b"ls\n".to_vec());
        assert_eq!(terminal.process_id(), "p1");
        assert!(format!("{:?}", terminal).starts_with("TerminalStream { process_id: \"p1\""));
    }

    #[tokio::test]
    async fn test_two_attachments_to_same_process() {
        let url = spawn_echo().await;
        let mut first = WsTerminalConnector.connect("p1", &url).await.unwrap();
        let mut second = WsTerminalConnector.connect("p1", &url).await.unwrap();

        first.send(b"a".to_vec()).await.unwrap();
        second.send(b"b".to_vec()).await.unwrap();

        assert_eq!(first.recv().await.unwrap(), b"a".to_vec());
        assert_eq!(second.recv().await.unwrap(), b"b".to_vec());
    }
}
