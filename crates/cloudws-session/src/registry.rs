//! Session registry
//!
//! Explicit per-session context handed to every component that talks to the
//! companion. Cloning shares the same availability state.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::Arc;
use url::Url;

use crate::address::{
    graphql_websocket_path, process_websocket_path, read_file_path, with_trailing_slash,
    write_file_path,
};
use crate::error::SessionError;
use crate::probe::Backoff;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    /// Nothing probed yet
    Unknown,
    /// Probing, the companion did not answer yet
    Probing,
    Available,
}

pub struct SessionRegistry {
    base_url: String,
    control_url: String,
    created_at: DateTime<Utc>,
    availability: Arc<RwLock<Availability>>,
    available_since: Arc<RwLock<Option<DateTime<Utc>>>>,
}

impl SessionRegistry {
    pub fn new(base_url: &str) -> Result<Self> {
        let parsed =
            Url::parse(base_url.trim()).map_err(|e| SessionError::InvalidUrl(e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(SessionError::NotHttp(base_url.to_string()));
        }

        let base_url = with_trailing_slash(base_url);
        let control_url = graphql_websocket_path(&base_url)?;

        tracing::debug!(base_url = %base_url, control_url = %control_url, "Registered session");

        Ok(Self {
            base_url,
            control_url,
            created_at: Utc::now(),
            availability: Arc::new(RwLock::new(Availability::Unknown)),
            available_since: Arc::new(RwLock::new(None)),
        })
    }

    /// Always ends with `/`
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn file_url(&self, relative_path: &str) -> String {
        read_file_path(&self.base_url, relative_path)
    }

    pub fn upload_url(&self) -> String {
        write_file_path(&self.base_url)
    }

    pub fn graphql_http_url(&self) -> String {
        format!("{}{}", self.base_url, crate::address::GRAPHQL_API_ROUTE)
    }

    /// Websocket endpoint of the control plane
    pub fn control_url(&self) -> &str {
        &self.control_url
    }

    /// Websocket endpoint of a process terminal
    pub fn terminal_url(&self, process_id: &str) -> Result<String> {
        process_websocket_path(&self.base_url, process_id)
    }

    pub fn availability(&self) -> Availability {
        *self.availability.read()
    }

    pub fn is_available(&self) -> bool {
        self.availability() == Availability::Available
    }

    pub fn available_since(&self) -> Option<DateTime<Utc>> {
        *self.available_since.read()
    }

    fn mark_available(&self) {
        *self.availability.write() = Availability::Available;
        *self.available_since.write() = Some(Utc::now());
    }

    /// Probe the companion until it answers.
    ///
    /// Gateway errors and transport failures mean the companion is not up yet;
    /// any other response counts as available. Never gives up.
    pub async fn probe_until_available(&self, client: &reqwest::Client, backoff: Backoff) {
        if self.is_available() {
            return;
        }
        *self.availability.write() = Availability::Probing;

        let mut attempt: u32 = 0;
        loop {
            match client.get(&self.base_url).send().await {
                Ok(response) if !is_gateway_error(response.status()) => {
                    tracing::info!(
                        base_url = %self.base_url,
                        attempts = attempt + 1,
                        "Workspace companion is available"
                    );
                    self.mark_available();
                    return;
                }
                Ok(response) => {
                    tracing::debug!(
                        base_url = %self.base_url,
                        status = %response.status(),
                        "Companion not ready yet"
                    );
                }
                Err(e) => {
                    tracing::debug!(base_url = %self.base_url, error = %e, "Companion unreachable");
                }
            }

            tokio::time::sleep(backoff.delay(attempt)).await;
            attempt = attempt.saturating_add(1);
        }
    }
}

fn is_gateway_error(status: reqwest::StatusCode) -> bool {
    matches!(
        status,
        reqwest::StatusCode::BAD_GATEWAY
            | reqwest::StatusCode::SERVICE_UNAVAILABLE
            | reqwest::StatusCode::GATEWAY_TIMEOUT
    )
}

impl Clone for SessionRegistry {
    fn clone(&self) -> Self {
        Self {
            base_url: self.base_url.clone(),
            control_url: self.control_url.clone(),
            created_at: self.created_at,
            availability: Arc::clone(&self.availability),
            available_since: Arc::clone(&self.available_since),
        }
    }
}
