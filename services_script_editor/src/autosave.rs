//! Periodic snapshot persistence
//!
//! The persister samples the host's live surface on a fixed period and
//! writes it verbatim under one key. It never re-serializes the document:
//! whatever the host shows, including edits the document never saw, is
//! what gets saved. There is no final write on stop.

use script_core::BlockDocument;
use tracing::{debug, info, warn};

use crate::config::EditorConfig;
use crate::cursor::SurfaceHost;
use crate::store::KeyValueStore;
use crate::timer::PeriodicTask;

/// Autosave driver for one session
#[derive(Debug, Clone)]
pub struct AutosavePersister {
    key: String,
    task: PeriodicTask,
}

impl AutosavePersister {
    pub fn new(key: impl Into<String>, period_ms: u64) -> Self {
        Self {
            key: key.into(),
            task: PeriodicTask::new(period_ms),
        }
    }

    pub fn from_config(config: &EditorConfig) -> Self {
        Self::new(config.storage_key.clone(), config.autosave_period_ms)
    }

    /// Store key the snapshot lives under
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn period_ms(&self) -> u64 {
        self.task.period_ms()
    }

    /// Load the last snapshot from `store`.
    ///
    /// Missing, unreadable or unparseable snapshots all yield a fresh
    /// document.
    pub fn mount<S: KeyValueStore + ?Sized>(&self, store: &S) -> BlockDocument {
        let raw = match store.get(&self.key) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(key = %self.key, error = %err, "failed to read snapshot, starting fresh");
                None
            }
        };

        let Some(raw) = raw else {
            info!(key = %self.key, "no saved snapshot, starting fresh");
            return BlockDocument::create();
        };

        match BlockDocument::try_load_snapshot(&raw) {
            Ok(document) => {
                info!(key = %self.key, blocks = document.len(), "restored snapshot");
                document
            }
            Err(err) => {
                warn!(key = %self.key, error = %err, "saved snapshot unusable, starting fresh");
                BlockDocument::create()
            }
        }
    }

    /// (Re)start the periodic task; the first write is one period after
    /// `now_ms`
    pub fn start(&mut self, now_ms: u64) {
        self.task.start(now_ms);
        debug!(period_ms = self.task.period_ms(), "autosave started");
    }

    /// Cancel the periodic task without writing
    pub fn stop(&mut self) {
        if self.task.is_running() {
            self.task.stop();
            debug!("autosave stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.is_running()
    }

    /// Number of ticks fired so far
    pub fn ticks(&self) -> u64 {
        self.task.fired_count()
    }

    /// Write the live surface if a tick is due at `now_ms`.
    ///
    /// Returns true if a snapshot was written. A failed write is logged and
    /// retried on the next tick.
    pub fn poll<H, S>(&mut self, now_ms: u64, host: &H, store: &mut S) -> bool
    where
        H: SurfaceHost + ?Sized,
        S: KeyValueStore + ?Sized,
    {
        if !self.task.poll(now_ms) {
            return false;
        }

        let surface = host.read_surface();
        match store.set(&self.key, &surface) {
            Ok(()) => {
                debug!(key = %self.key, bytes = surface.len(), "autosaved snapshot");
                true
            }
            Err(err) => {
                warn!(key = %self.key, error = %err, "autosave write failed");
                false
            }
        }
    }
}
