//! Shared job directory cursor

use std::fs::{self, DirEntry, ReadDir};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::error::Result;

/// A directory listing shared by all workers
///
/// The lock is held only while advancing; filtering happens outside it.
pub struct JobCursor {
    dir: PathBuf,
    suffix: String,
    entries: Mutex<ReadDir>,
}

impl JobCursor {
    /// Open `dir` and yield regular files ending in `suffix`
    pub fn open(dir: &Path, suffix: &str) -> Result<Self> {
        let entries = fs::read_dir(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            suffix: suffix.to_string(),
            entries: Mutex::new(entries),
        })
    }

    /// Claim the next job file, or `None` once the listing is exhausted
    pub fn next_job(&self) -> Option<PathBuf> {
        loop {
            let entry = self.entries.lock().next()?;

            match entry {
                Ok(entry) if self.is_job(&entry) => return Some(entry.path()),
                Ok(_) => continue,
                Err(e) => {
                    tracing::warn!("Failed to read entry in {}: {}", self.dir.display(), e);
                    continue;
                }
            }
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn is_job(&self, entry: &DirEntry) -> bool {
        let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
        is_file && entry.file_name().to_string_lossy().ends_with(&self.suffix)
    }
}
