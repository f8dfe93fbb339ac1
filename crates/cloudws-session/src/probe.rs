//! Availability probe backoff

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Capped exponential backoff between availability probes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Backoff {
    pub initial_ms: u64,
    pub max_ms: u64,
    pub multiplier: u32,
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            initial_ms: initial.as_millis() as u64,
            max_ms: max.as_millis() as u64,
            multiplier: 2,
        }
    }

    /// Delay before the given retry (0 = first retry)
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = u64::from(self.multiplier.max(1)).saturating_pow(attempt);
        let delay = self.initial_ms.saturating_mul(factor).min(self.max_ms);
        Duration::from_millis(delay)
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(Duration::from_millis(500), Duration::from_secs(10))
    }
}
