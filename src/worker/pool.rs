//! Worker pool
//!
//! Fixed set of threads draining the job directory.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use super::{JobCursor, JobRunner};
use crate::backup::BackupScheduler;
use crate::config::Config;
use crate::engine::Engine;
use crate::error::Result;

/// Totals for one pool run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub workers: usize,
    pub jobs_processed: usize,
    pub jobs_failed: usize,
    pub backups_started: usize,
    pub backups_failed: usize,
}

/// Owns the engine and backup scheduler for a run
///
/// ## Lifecycle
/// 1. `run` opens the job directory and starts `max_threads` workers
/// 2. Each worker claims job files until the directory is exhausted
/// 3. After every worker has exited, outstanding backups are reaped
pub struct WorkerPool {
    config: Config,
    engine: Engine,
    scheduler: BackupScheduler,
}

impl WorkerPool {
    /// Create a pool with a fresh engine
    pub fn new(config: Config) -> Result<Self> {
        Self::with_engine(config, Engine::new())
    }

    /// Create a pool around an existing engine
    pub fn with_engine(config: Config, engine: Engine) -> Result<Self> {
        config.validate()?;
        let scheduler = BackupScheduler::new(config.max_backups);
        Ok(Self {
            config,
            engine,
            scheduler,
        })
    }

    /// Process every job file in the configured directory
    pub fn run(&self) -> Result<RunSummary> {
        let cursor = JobCursor::open(&self.config.jobs_dir, &self.config.job_suffix)?;
        let processed = AtomicUsize::new(0);
        let failed = AtomicUsize::new(0);

        tracing::info!(
            dir = %cursor.dir().display(),
            threads = self.config.max_threads,
            max_backups = self.config.max_backups,
            "starting workers"
        );

        let workers = thread::scope(|scope| {
            let mut handles = Vec::with_capacity(self.config.max_threads);
            for n in 0..self.config.max_threads {
                let spawned = thread::Builder::new()
                    .name(format!("worker-{}", n))
                    .spawn_scoped(scope, || self.worker_loop(&cursor, &processed, &failed));
                match spawned {
                    Ok(handle) => handles.push(handle),
                    Err(e) => tracing::error!("Error creating thread number {}: {}", n, e),
                }
            }

            let workers = handles.len();
            for (n, handle) in handles.into_iter().enumerate() {
                if handle.join().is_err() {
                    tracing::error!("Error joining thread number {}", n);
                }
            }
            workers
        });

        let reaped = self.scheduler.wait_all();
        tracing::debug!(reaped, "all backups reaped");

        Ok(RunSummary {
            workers,
            jobs_processed: processed.into_inner(),
            jobs_failed: failed.into_inner(),
            backups_started: self.scheduler.started(),
            backups_failed: self.scheduler.failed(),
        })
    }

    fn worker_loop(&self, cursor: &JobCursor, processed: &AtomicUsize, failed: &AtomicUsize) {
        let runner = JobRunner::new(&self.engine, &self.scheduler, &self.config);

        while let Some(path) = cursor.next_job() {
            let _span = tracing::debug_span!("job", path = %path.display()).entered();

            match runner.run(&path) {
                Ok(report) => {
                    processed.fetch_add(1, Ordering::SeqCst);
                    tracing::debug!(?report, "job finished");
                }
                Err(e) => {
                    failed.fetch_add(1, Ordering::SeqCst);
                    tracing::error!("Job aborted: {}", e);
                }
            }
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn scheduler(&self) -> &BackupScheduler {
        &self.scheduler
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
