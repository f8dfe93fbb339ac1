//! Auto-save for editor buffers
//!
//! ```text
//! Idle ──edit──▶ Pending(timer) ──timer──▶ InFlight ──done──▶ Idle
//!                  ▲   │ edit re-arms          │ edit marks dirty
//!                  └───┴───────────────────────┘ done while dirty
//! ```
//!
//! A burst of edits inside the window results in a single write of the last
//! buffer. At most one write is in flight; failures are reported once and not
//! retried.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use cloudws_session::extract_relative_file_path;

use crate::api::FileApi;
use crate::error::FileError;
use crate::Result;

pub const DEFAULT_SAVE_WINDOW: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveState {
    Idle,
    /// Timer armed; only the timer of `generation` may fire the write
    Pending { generation: u64 },
    /// Write running; `dirty` when the buffer changed meanwhile
    InFlight { dirty: bool },
}

impl SaveState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaveState::Idle => "idle",
            SaveState::Pending { .. } => "pending",
            SaveState::InFlight { .. } => "in_flight",
        }
    }
}

impl std::fmt::Display for SaveState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveAction {
    /// (Re)arm the timer for this generation
    ArmTimer(u64),
    Write,
    Nothing,
}

/// Pure transition logic, no timers or I/O
#[derive(Debug, Clone)]
pub struct SaveMachine {
    state: SaveState,
    generation: u64,
}

impl SaveMachine {
    pub fn new() -> Self {
        Self {
            state: SaveState::Idle,
            generation: 0,
        }
    }

    pub fn state(&self) -> SaveState {
        self.state
    }

    fn arm(&mut self) -> SaveAction {
        self.generation += 1;
        self.state = SaveState::Pending {
            generation: self.generation,
        };
        SaveAction::ArmTimer(self.generation)
    }

    pub fn edit(&mut self) -> SaveAction {
        match self.state {
            SaveState::Idle | SaveState::Pending { .. } => self.arm(),
            SaveState::InFlight { .. } => {
                self.state = SaveState::InFlight { dirty: true };
                SaveAction::Nothing
            }
        }
    }

    /// Stale timers are ignored
    pub fn timer_fired(&mut self, generation: u64) -> SaveAction {
        match self.state {
            SaveState::Pending { generation: armed } if armed == generation => {
                self.state = SaveState::InFlight { dirty: false };
                SaveAction::Write
            }
            _ => SaveAction::Nothing,
        }
    }

    pub fn write_finished(&mut self) -> SaveAction {
        match self.state {
            SaveState::InFlight { dirty: true } => self.arm(),
            SaveState::InFlight { dirty: false } => {
                self.state = SaveState::Idle;
                SaveAction::Nothing
            }
            _ => SaveAction::Nothing,
        }
    }
}

impl Default for SaveMachine {
    fn default() -> Self {
        Self::new()
    }
}

/// Drives a [`SaveMachine`] for one file on a background task
pub struct AutoSaver {
    path: String,
    edits: mpsc::UnboundedSender<Vec<u8>>,
    machine: Arc<Mutex<SaveMachine>>,
    failures: mpsc::UnboundedReceiver<FileError>,
    driver: JoinHandle<()>,
}

impl AutoSaver {
    pub fn new(api: Arc<dyn FileApi>, path: impl Into<String>, window: Duration) -> Self {
        let path = path.into();
        let machine = Arc::new(Mutex::new(SaveMachine::new()));
        let (edits_tx, edits_rx) = mpsc::unbounded_channel();
        let (failures_tx, failures_rx) = mpsc::unbounded_channel();

        let driver = tokio::spawn(drive(
            api,
            path.clone(),
            window,
            Arc::clone(&machine),
            edits_rx,
            failures_tx,
        ));

        Self {
            path,
            edits: edits_tx,
            machine,
            failures: failures_rx,
            driver,
        }
    }

    /// Saver for the file served at `file_url` (`…/files/{path}`)
    pub fn for_file_url(api: Arc<dyn FileApi>, file_url: &str, window: Duration) -> Result<Self> {
        let path = extract_relative_file_path(file_url)?;
        Ok(Self::new(api, path, window))
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn state(&self) -> SaveState {
        self.machine.lock().state()
    }

    /// Replace the buffer to be saved
    pub fn edit(&self, contents: impl Into<Vec<u8>>) -> Result<()> {
        self.edits
            .send(contents.into())
            .map_err(|_| FileError::SaverClosed)
    }

    /// Next failed write, if any; each failure is returned once
    pub fn take_failure(&mut self) -> Option<FileError> {
        self.failures.try_recv().ok()
    }

    /// Stop accepting edits and wait for the last write to land
    pub async fn shutdown(self) {
        let AutoSaver { edits, driver, .. } = self;
        drop(edits);
        if let Err(e) = driver.await {
            tracing::warn!(error = %e, "Auto-save driver failed");
        }
    }
}

async fn drive(
    api: Arc<dyn FileApi>,
    path: String,
    window: Duration,
    machine: Arc<Mutex<SaveMachine>>,
    mut edits: mpsc::UnboundedReceiver<Vec<u8>>,
    failures: mpsc::UnboundedSender<FileError>,
) {
    let (done_tx, mut done_rx) = mpsc::channel::<Result<()>>(1);
    let mut buffer: Vec<u8> = Vec::new();
    let mut timer: Option<(u64, Instant)> = None;
    let mut closed = false;

    let start_write = |contents: Vec<u8>| {
        let api = Arc::clone(&api);
        let path = path.clone();
        let done_tx = done_tx.clone();
        tokio::spawn(async move {
            let _ = done_tx.send(api.write_file(&path, contents).await).await;
        });
    };

    loop {
        let deadline = timer.map(|(_, at)| at).unwrap_or_else(Instant::now);

        tokio::select! {
            edit = edits.recv(), if !closed => {
                let Some(contents) = edit else {
                    closed = true;
                    // Flush whatever is still waiting for its timer
                    if let Some((generation, _)) = timer {
                        timer = Some((generation, Instant::now()));
                    }
                    if machine.lock().state() == SaveState::Idle {
                        break;
                    }
                    continue;
                };
                buffer = contents;
                if let SaveAction::ArmTimer(generation) = machine.lock().edit() {
                    timer = Some((generation, Instant::now() + window));
                }
            }
            _ = tokio::time::sleep_until(deadline), if timer.is_some() => {
                let Some((generation, _)) = timer.take() else { continue };
                if machine.lock().timer_fired(generation) == SaveAction::Write {
                    tracing::debug!(path = %path, bytes = buffer.len(), "Auto-saving");
                    start_write(buffer.clone());
                }
            }
            Some(result) = done_rx.recv() => {
                if let Err(e) = result {
                    tracing::warn!(path = %path, error = %e, "Auto-save failed");
                    let _ = failures.send(e);
                }
                let next = machine.lock().write_finished();
                match next {
                    SaveAction::ArmTimer(generation) => {
                        let at = if closed { Instant::now() } else { Instant::now() + window };
                        timer = Some((generation, at));
                    }
                    _ if closed => break,
                    _ => {}
                }
            }
        }
    }

    tracing::debug!(path = %path, "Auto-save stopped");
}
