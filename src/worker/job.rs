//! Job processing
//!
//! One worker owns one job file from open to close.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::backup::BackupScheduler;
use crate::config::Config;
use crate::engine::Engine;
use crate::error::{KvsError, Result};
use crate::protocol::{Command, CommandReader, Limits};

/// `dir/name.job` → `dir/name.out`
pub fn output_path(job: &Path, job_suffix: &str, out_suffix: &str) -> PathBuf {
    job.with_file_name(format!("{}{}", base_name(job, job_suffix), out_suffix))
}

/// `dir/name.job` → `dir/name-N.bck`
pub fn backup_path(job: &Path, job_suffix: &str, seq: u64, backup_suffix: &str) -> PathBuf {
    job.with_file_name(format!("{}-{}{}", base_name(job, job_suffix), seq, backup_suffix))
}

fn base_name(job: &Path, job_suffix: &str) -> String {
    let name = job
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match name.strip_suffix(job_suffix) {
        Some(stem) => stem.to_string(),
        None => name,
    }
}

/// Per-job state owned by the worker
#[derive(Debug, Clone)]
pub struct JobContext {
    pub job_path: PathBuf,
    pub out_path: PathBuf,

    /// Sequence number of the next backup of this job (starts at 1)
    pub next_backup: u64,
}

impl JobContext {
    pub fn new(job_path: PathBuf, config: &Config) -> Self {
        let out_path = output_path(&job_path, &config.job_suffix, &config.out_suffix);
        Self {
            job_path,
            out_path,
            next_backup: 1,
        }
    }

    /// Path of the next backup
    pub fn backup_path(&self, config: &Config) -> PathBuf {
        backup_path(&self.job_path, &config.job_suffix, self.next_backup, &config.backup_suffix)
    }
}

/// Counters for one finished job
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct JobReport {
    /// Commands executed, excluding blank lines and end of file
    pub commands: usize,
    pub invalid: usize,
    pub failed: usize,
    pub backups: usize,
}

/// Runs job files against an engine
pub struct JobRunner<'a> {
    engine: &'a Engine,
    scheduler: &'a BackupScheduler,
    config: &'a Config,
}

impl<'a> JobRunner<'a> {
    pub fn new(engine: &'a Engine, scheduler: &'a BackupScheduler, config: &'a Config) -> Self {
        Self {
            engine,
            scheduler,
            config,
        }
    }

    /// Execute every command of `job_path`, writing results next to it.
    ///
    /// Returns an error only when the job has to be abandoned: the job or
    /// output file cannot be opened or written, or a backup task cannot be
    /// started. Invalid and failed commands are logged and skipped.
    pub fn run(&self, job_path: &Path) -> Result<JobReport> {
        let mut ctx = JobContext::new(job_path.to_path_buf(), self.config);

        let input = File::open(&ctx.job_path).map_err(|e| {
            tracing::error!("Failed to open job file {}: {}", ctx.job_path.display(), e);
            KvsError::Io(e)
        })?;
        let output = File::create(&ctx.out_path).map_err(|e| {
            tracing::error!("Failed to create output file {}: {}", ctx.out_path.display(), e);
            KvsError::Io(e)
        })?;

        let mut reader = CommandReader::new(BufReader::new(input), Limits::from_config(self.config));
        let mut out = BufWriter::new(output);
        let mut report = JobReport::default();

        loop {
            let command = reader.next_command()?;
            tracing::trace!(line = reader.line_no(), ?command, "command");

            match command {
                Command::EndOfFile => break,
                Command::Empty => continue,
                Command::Invalid { reason } => {
                    report.invalid += 1;
                    tracing::warn!(line = reader.line_no(), %reason, "Invalid command. See HELP for usage");
                }
                Command::Backup => {
                    report.commands += 1;
                    self.backup(&mut ctx, &mut report)?;
                }
                command => {
                    report.commands += 1;
                    match self.engine.execute(&command, &mut out) {
                        Ok(()) => {}
                        Err(e @ KvsError::Io(_)) => return Err(e),
                        Err(e) => {
                            report.failed += 1;
                            tracing::warn!(line = reader.line_no(), "Failed to {:?}: {}", command.command_type(), e);
                        }
                    }
                }
            }
        }

        out.flush()?;
        Ok(report)
    }

    /// Hand a snapshot off to the scheduler; the job continues immediately
    fn backup(&self, ctx: &mut JobContext, report: &mut JobReport) -> Result<()> {
        let path = ctx.backup_path(self.config);
        match self.scheduler.schedule(self.engine, path) {
            Ok(id) => {
                tracing::debug!(id, seq = ctx.next_backup, "backup scheduled");
                ctx.next_backup += 1;
                report.backups += 1;
                Ok(())
            }
            Err(e @ KvsError::BackupSpawn(_)) => {
                tracing::error!("{}", e);
                Err(e)
            }
            Err(e) => {
                report.failed += 1;
                tracing::warn!("Failed to perform backup: {}", e);
                Ok(())
            }
        }
    }
}
