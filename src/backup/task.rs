//! Backup task body
//!
//! Serializes a detached snapshot to its `.bck` file.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::engine::Engine;
use crate::error::{KvsError, Result};
use crate::store::Snapshot;

/// Write `snapshot` to `path`, truncating any previous file
pub fn write_backup(snapshot: &Snapshot, path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|e| {
        KvsError::Backup(format!("Failed to create backup file: {}: {}", path.display(), e))
    })?;

    let mut writer = BufWriter::new(file);
    Engine::backup(snapshot, &mut writer)?;
    writer.flush()?;
    Ok(())
}
