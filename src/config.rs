//! Configuration for partkv
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::error::{KvsError, Result};

/// Main configuration for a partkv run
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Job Configuration
    // -------------------------------------------------------------------------
    /// Directory scanned for job files.
    /// Outputs and backups are written next to each job:
    ///   {jobs_dir}/
    ///     ├── name.job       (input)
    ///     ├── name.out       (command output)
    ///     └── name-N.bck     (N-th backup of this job)
    pub jobs_dir: PathBuf,

    /// Suffix identifying job files
    pub job_suffix: String,

    /// Suffix replacing `job_suffix` for the output file
    pub out_suffix: String,

    /// Suffix of backup files (after `-N`)
    pub backup_suffix: String,

    // -------------------------------------------------------------------------
    // Concurrency Configuration
    // -------------------------------------------------------------------------
    /// Number of worker threads draining the job directory
    pub max_threads: usize,

    /// Max snapshots outstanding at once
    pub max_backups: usize,

    // -------------------------------------------------------------------------
    // Command Limits
    // -------------------------------------------------------------------------
    /// Max pairs (or keys) per WRITE/READ/DELETE
    pub max_write_size: usize,

    /// Max key/value buffer size, terminator included
    /// (tokens may hold at most `max_string_size - 1` bytes)
    pub max_string_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            jobs_dir: PathBuf::from("./jobs"),
            job_suffix: ".job".to_string(),
            out_suffix: ".out".to_string(),
            backup_suffix: ".bck".to_string(),
            max_threads: 1,
            max_backups: 1,
            max_write_size: 10,
            max_string_size: 40,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Reject values the worker pool and scheduler cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.max_threads == 0 {
            return Err(KvsError::Config("max_threads must be at least 1".into()));
        }
        if self.max_backups == 0 {
            return Err(KvsError::Config("max_backups must be at least 1".into()));
        }
        if self.max_write_size == 0 {
            return Err(KvsError::Config("max_write_size must be at least 1".into()));
        }
        if self.max_string_size < 2 {
            return Err(KvsError::Config("max_string_size must be at least 2".into()));
        }
        if self.job_suffix.is_empty() {
            return Err(KvsError::Config("job_suffix must not be empty".into()));
        }
        Ok(())
    }

    /// Longest key or value accepted from a job file, in bytes
    pub fn max_token_len(&self) -> usize {
        self.max_string_size.saturating_sub(1)
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the job directory
    pub fn jobs_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.jobs_dir = path.into();
        self
    }

    /// Set the number of worker threads
    pub fn max_threads(mut self, count: usize) -> Self {
        self.config.max_threads = count;
        self
    }

    /// Set the cap on outstanding backups
    pub fn max_backups(mut self, count: usize) -> Self {
        self.config.max_backups = count;
        self
    }

    /// Set the max pairs per command
    pub fn max_write_size(mut self, count: usize) -> Self {
        self.config.max_write_size = count;
        self
    }

    /// Set the max key/value buffer size
    pub fn max_string_size(mut self, size: usize) -> Self {
        self.config.max_string_size = size;
        self
    }

    /// Set the job file suffix
    pub fn job_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.config.job_suffix = suffix.into();
        self
    }

    /// Set the output file suffix
    pub fn out_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.config.out_suffix = suffix.into();
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
