//! Control-plane channel seam

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::Result;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphqlRequest {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,
}

/// One event of a subscription-style exchange
#[derive(Debug, Clone, PartialEq)]
pub enum SubscriptionEvent {
    /// Execution result (`{ data, errors }`)
    Next(Value),
    /// Channel-level failure; ends the exchange
    Error(String),
    Complete,
}

/// Long-lived channel issuing subscription-style requests.
///
/// The returned receiver yields events until `Complete` or `Error`.
/// Dropping it cancels the exchange.
#[async_trait]
pub trait ControlChannel: Send + Sync {
    async fn subscribe(&self, request: GraphqlRequest)
        -> Result<mpsc::Receiver<SubscriptionEvent>>;
}
