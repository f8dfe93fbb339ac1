//! Control channel over the `graphql-transport-ws` protocol
//!
//! A single reader/writer loop owns the websocket. Subscriptions register a
//! sender under a fresh id and the loop routes `next`/`error`/`complete`
//! messages back to them.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use uuid::Uuid;

use crate::channel::{ControlChannel, GraphqlRequest, SubscriptionEvent};
use crate::error::ProcessError;
use crate::Result;

pub const GRAPHQL_WS_PROTOCOL: &str = "graphql-transport-ws";

const CONNECTION_ACK_TIMEOUT: Duration = Duration::from_secs(10);

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

struct SubscribeCommand {
    id: String,
    request: GraphqlRequest,
    events: mpsc::Sender<SubscriptionEvent>,
}

pub struct GraphqlWsChannel {
    url: String,
    cmd_tx: mpsc::Sender<SubscribeCommand>,
    handler: JoinHandle<()>,
}

impl GraphqlWsChannel {
    /// Connect and complete the `connection_init` handshake
    pub async fn connect(url: &str) -> Result<Self> {
        let mut request = url.into_client_request()?;
        request.headers_mut().insert(
            "Sec-WebSocket-Protocol",
            HeaderValue::from_static(GRAPHQL_WS_PROTOCOL),
        );

        let (mut ws, _) = connect_async(request).await?;

        ws.send(Message::Text(
            json!({ "type": "connection_init", "payload": {} })
                .to_string()
                .into(),
        ))
        .await?;

        tokio::time::timeout(CONNECTION_ACK_TIMEOUT, wait_for_ack(&mut ws))
            .await
            .map_err(|_| ProcessError::Protocol("connection_ack timed out".to_string()))??;

        let (cmd_tx, cmd_rx) = mpsc::channel(64);
        let handler = tokio::spawn(handler_loop(ws, cmd_rx));

        tracing::info!(url = %url, "Control channel established");

        Ok(Self {
            url: url.to_string(),
            cmd_tx,
            handler,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_closed(&self) -> bool {
        self.cmd_tx.is_closed()
    }
}

#[async_trait]
impl ControlChannel for GraphqlWsChannel {
    async fn subscribe(
        &self,
        request: GraphqlRequest,
    ) -> Result<mpsc::Receiver<SubscriptionEvent>> {
        let (events_tx, events_rx) = mpsc::channel(16);
        self.cmd_tx
            .send(SubscribeCommand {
                id: Uuid::new_v4().to_string(),
                request,
                events: events_tx,
            })
            .await
            .map_err(|_| ProcessError::Protocol("control channel closed".to_string()))?;
        Ok(events_rx)
    }
}

impl Drop for GraphqlWsChannel {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

async fn wait_for_ack(ws: &mut WsStream) -> Result<()> {
    while let Some(msg) = ws.next().await {
        let Message::Text(text) = msg? else { continue };
        let Ok(val): std::result::Result<Value, _> = serde_json::from_str(&text) else {
            continue;
        };
        match val["type"].as_str() {
            Some("connection_ack") => return Ok(()),
            Some("ping") => {
                ws.send(Message::Text(json!({ "type": "pong" }).to_string().into()))
                    .await?;
            }
            _ => {}
        }
    }
    Err(ProcessError::Protocol(
        "connection closed before connection_ack".to_string(),
    ))
}

async fn handler_loop(ws: WsStream, mut cmd_rx: mpsc::Receiver<SubscribeCommand>) {
    let (mut ws_tx, mut ws_rx) = ws.split();
    let mut pending: HashMap<String, mpsc::Sender<SubscriptionEvent>> = HashMap::new();

    let close_reason = loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                let Some(cmd) = cmd else { break "channel dropped".to_string() };
                let msg = json!({
                    "id": cmd.id,
                    "type": "subscribe",
                    "payload": cmd.request,
                });
                pending.insert(cmd.id, cmd.events);
                if let Err(e) = ws_tx.send(Message::Text(msg.to_string().into())).await {
                    break e.to_string();
                }
            }
            msg = ws_rx.next() => {
                let text = match msg {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(Message::Close(frame))) => {
                        break frame
                            .map(|f| format!("control channel closed: {} {}", u16::from(f.code), f.reason.as_str()))
                            .unwrap_or_else(|| "control channel closed".to_string());
                    }
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => break e.to_string(),
                    None => break "control channel closed".to_string(),
                };
                let Ok(val): std::result::Result<Value, _> = serde_json::from_str(&text) else {
                    tracing::warn!("Ignoring malformed control channel message");
                    continue;
                };

                if val["type"].as_str() == Some("ping") {
                    let pong = json!({ "type": "pong" }).to_string();
                    if let Err(e) = ws_tx.send(Message::Text(pong.into())).await {
                        break e.to_string();
                    }
                    continue;
                }

                let Some(id) = val["id"].as_str() else { continue };
                let event = match val["type"].as_str() {
                    Some("next") => SubscriptionEvent::Next(val["payload"].clone()),
                    Some("error") => SubscriptionEvent::Error(error_message(&val["payload"])),
                    Some("complete") => SubscriptionEvent::Complete,
                    _ => continue,
                };
                let finished = !matches!(event, SubscriptionEvent::Next(_));

                let delivered = match pending.get(id) {
                    Some(tx) => tx.send(event).await.is_ok(),
                    None => continue,
                };

                if finished {
                    pending.remove(id);
                } else if !delivered {
                    // Subscriber went away: stop the exchange server-side too
                    pending.remove(id);
                    let complete = json!({ "id": id, "type": "complete" }).to_string();
                    if let Err(e) = ws_tx.send(Message::Text(complete.into())).await {
                        break e.to_string();
                    }
                }
            }
        }
    };

    tracing::debug!(reason = %close_reason, pending = pending.len(), "Control channel loop ended");

    for (_, tx) in pending.drain() {
        let _ = tx.send(SubscriptionEvent::Error(close_reason.clone())).await;
    }
}

/// `error` payloads are a list of GraphQL errors
fn error_message(payload: &Value) -> String {
    match payload {
        Value::Array(errors) => errors
            .iter()
            .map(|e| e["message"].as_str().unwrap_or("unknown error").to_string())
            .collect::<Vec<_>>()
            .join("; "),
        Value::Object(_) => payload["message"]
            .as_str()
            .unwrap_or("unknown error")
            .to_string(),
        other => other.to_string(),
    }
}
