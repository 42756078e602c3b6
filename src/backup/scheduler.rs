//! Backup scheduler
//!
//! Runs snapshot writers in the background, at most `max_outstanding` at a
//! time.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};

use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::Mutex;

use super::task::write_backup;
use crate::engine::Engine;
use crate::error::{KvsError, Result};

type TaskHandle = JoinHandle<Result<PathBuf>>;

/// Bounded launcher for backup tasks
///
/// ## Admission
/// `schedule` holds the `outstanding` mutex from admission until the new
/// task is registered. At the cap it blocks until *any* outstanding task
/// reports completion, reaps it, and proceeds. There is no per-slot
/// tracking or fairness between waiting workers.
///
/// ## Reaping
/// Every task sends its id on `done_tx` when it finishes (even on panic).
/// Reaping receives one id and joins the matching handle.
pub struct BackupScheduler {
    max_outstanding: usize,

    /// Tasks launched and not yet reaped; its length is the outstanding count
    outstanding: Mutex<HashMap<u64, TaskHandle>>,

    done_tx: Sender<u64>,
    done_rx: Receiver<u64>,

    next_id: AtomicU64,
    started: AtomicUsize,
    failed: AtomicUsize,
    peak: AtomicUsize,
}

/// Reports a task as finished when dropped
struct Completion {
    id: u64,
    done_tx: Sender<u64>,
}

impl Drop for Completion {
    fn drop(&mut self) {
        // The scheduler owns a receiver for its whole lifetime
        let _ = self.done_tx.send(self.id);
    }
}

impl BackupScheduler {
    /// Create a scheduler allowing `max_outstanding` concurrent backups
    pub fn new(max_outstanding: usize) -> Self {
        let (done_tx, done_rx) = channel::unbounded();
        Self {
            max_outstanding: max_outstanding.max(1),
            outstanding: Mutex::new(HashMap::new()),
            done_tx,
            done_rx,
            next_id: AtomicU64::new(1),
            started: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    /// Snapshot `engine` and write it to `path` in the background.
    ///
    /// Blocks while `max_outstanding` backups are running. Returns once the
    /// snapshot is taken; the file is written later. Fails only if the
    /// store is uninitialized or the task cannot be started.
    pub fn schedule(&self, engine: &Engine, path: PathBuf) -> Result<u64> {
        self.launch(|| {
            let snapshot = engine.snapshot()?;
            Ok(move || {
                write_backup(&snapshot, &path)?;
                Ok(path)
            })
        })
    }

    /// Admit, prepare and spawn one task
    fn launch<P, T>(&self, prepare: P) -> Result<u64>
    where
        P: FnOnce() -> Result<T>,
        T: FnOnce() -> Result<PathBuf> + Send + 'static,
    {
        let mut outstanding = self.outstanding.lock();
        while outstanding.len() >= self.max_outstanding {
            tracing::debug!(outstanding = outstanding.len(), "backup limit reached, waiting");
            self.reap_one(&mut outstanding);
        }

        let task = prepare()?;

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let completion = Completion {
            id,
            done_tx: self.done_tx.clone(),
        };
        let handle = thread::Builder::new()
            .name(format!("backup-{}", id))
            .spawn(move || {
                let _completion = completion;
                task()
            })
            .map_err(|e| KvsError::BackupSpawn(e.to_string()))?;

        outstanding.insert(id, handle);
        self.started.fetch_add(1, Ordering::SeqCst);
        self.peak.fetch_max(outstanding.len(), Ordering::SeqCst);
        tracing::debug!(id, outstanding = outstanding.len(), "backup started");
        Ok(id)
    }

    /// Block until one task finishes, then join it.
    ///
    /// Returns `false` if the completion belonged to a task that was never
    /// registered (its thread failed to spawn).
    fn reap_one(&self, outstanding: &mut HashMap<u64, TaskHandle>) -> bool {
        let id = match self.done_rx.recv() {
            Ok(id) => id,
            Err(_) => return false,
        };

        let Some(handle) = outstanding.remove(&id) else {
            tracing::warn!(id, "completion for unknown backup");
            return false;
        };

        match handle.join() {
            Ok(Ok(path)) => tracing::debug!(id, path = %path.display(), "backup finished"),
            Ok(Err(e)) => {
                self.failed.fetch_add(1, Ordering::SeqCst);
                tracing::error!(id, "backup failed: {}", e);
            }
            Err(_) => {
                self.failed.fetch_add(1, Ordering::SeqCst);
                tracing::error!(id, "backup task panicked");
            }
        }
        true
    }

    /// Reap every outstanding task. Returns how many were reaped.
    pub fn wait_all(&self) -> usize {
        let mut outstanding = self.outstanding.lock();
        let mut reaped = 0;
        while !outstanding.is_empty() {
            if self.reap_one(&mut outstanding) {
                reaped += 1;
            }
        }
        reaped
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Tasks launched and not yet reaped
    pub fn outstanding(&self) -> usize {
        self.outstanding.lock().len()
    }

    pub fn max_outstanding(&self) -> usize {
        self.max_outstanding
    }

    /// Most tasks ever outstanding at once
    pub fn peak_outstanding(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    /// Tasks launched so far
    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    /// Reaped tasks that failed or panicked
    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::SeqCst)
    }
}
