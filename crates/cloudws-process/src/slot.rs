//! Per-view process start state machine
//!
//! ```text
//! Unstarted
//!   ↓ start issued
//! Starting
//!   ↓ id received          ↓ failure
//! Started(id)            Unstarted
//! ```
//!
//! A view that already has an id, or has a start in flight, never issues a
//! second start. A start whose caller is dropped mid-flight returns the slot
//! to `Unstarted`; its late result is ignored.

use parking_lot::Mutex;
use std::sync::Arc;

use crate::multiplexer::ProcessMultiplexer;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartState {
    Unstarted,
    /// Request in flight
    Starting,
    Started(String),
}

impl StartState {
    pub fn can_transition_to(&self, target: &StartState) -> bool {
        match (self, target) {
            (StartState::Unstarted, StartState::Starting) => true,
            (StartState::Starting, StartState::Started(_)) => true,
            // Failed start
            (StartState::Starting, StartState::Unstarted) => true,
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StartState::Unstarted => "unstarted",
            StartState::Starting => "starting",
            StartState::Started(_) => "started",
        }
    }

    pub fn process_id(&self) -> Option<&str> {
        match self {
            StartState::Started(id) => Some(id),
            _ => None,
        }
    }
}

impl std::fmt::Display for StartState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotStatus {
    Ready(String),
    /// Another caller's start is still in flight
    InFlight,
}

pub struct ProcessSlot {
    state: Arc<Mutex<StartState>>,
    command: Option<Vec<String>>,
}

impl ProcessSlot {
    /// Slot for the multiplexer's default command
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(StartState::Unstarted)),
            command: None,
        }
    }

    pub fn with_command(command: Vec<String>) -> Self {
        Self {
            state: Arc::new(Mutex::new(StartState::Unstarted)),
            command: Some(command),
        }
    }

    pub fn state(&self) -> StartState {
        self.state.lock().clone()
    }

    pub fn process_id(&self) -> Option<String> {
        self.state.lock().process_id().map(str::to_string)
    }

    /// Start the slot's process unless it is started or starting
    pub async fn ensure_started(&self, multiplexer: &ProcessMultiplexer) -> Result<SlotStatus> {
        {
            let mut state = self.state.lock();
            match &*state {
                StartState::Started(id) => return Ok(SlotStatus::Ready(id.clone())),
                StartState::Starting => return Ok(SlotStatus::InFlight),
                StartState::Unstarted => *state = StartState::Starting,
            }
        }
        let guard = StartGuard::new(&self.state);

        match multiplexer.start(self.command.clone()).await {
            Ok(handle) => {
                guard.finish(StartState::Started(handle.id.clone()));
                Ok(SlotStatus::Ready(handle.id))
            }
            Err(e) => {
                guard.finish(StartState::Unstarted);
                Err(e)
            }
        }
    }
}

/// Owns the `Starting` state of one start; dropping it unfinished reverts it
struct StartGuard<'a> {
    state: &'a Mutex<StartState>,
    finished: bool,
}

impl<'a> StartGuard<'a> {
    fn new(state: &'a Mutex<StartState>) -> Self {
        Self {
            state,
            finished: false,
        }
    }

    fn finish(mut self, target: StartState) {
        self.finished = true;
        transition(self.state, target);
    }
}

impl Drop for StartGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            tracing::debug!("Process start cancelled");
            transition(self.state, StartState::Unstarted);
        }
    }
}

fn transition(state: &Mutex<StartState>, target: StartState) {
    let mut state = state.lock();
    debug_assert!(state.can_transition_to(&target), "{} -> {}", state, target);
    tracing::debug!(from = %*state, to = %target, "Process slot transition");
    *state = target;
}

impl Default for ProcessSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for ProcessSlot {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            command: self.command.clone(),
        }
    }
}
