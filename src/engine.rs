//! Engine Module
//!
//! Executes store commands against the partitioned table.
//!
//! ## Responsibilities
//! - Take the right locks, in the right order, for each command
//! - Format command results for the job output
//! - Produce detached snapshots for backups
//! - Track whether the store has been initialized

use std::io::Write;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use bytes::BytesMut;
use parking_lot::RwLock;

use crate::error::{KvsError, Result};
use crate::protocol::{put_entry_line, Command, ResultLine, HELP_TEXT, KVS_ERROR, KVS_MISSING, WAITING};
use crate::store::{partition_index, LockPlan, Snapshot, Table};

/// The command engine
///
/// ## Concurrency Model
///
/// | command  | table lock | partition locks          |
/// |----------|------------|--------------------------|
/// | WRITE    | write      | write, per [`LockPlan`]  |
/// | DELETE   | write      | write, per [`LockPlan`]  |
/// | READ     | -          | read, per [`LockPlan`]   |
/// | SHOW     | write      | read, one at a time      |
/// | snapshot | write      | read, one at a time      |
///
/// - READs never block each other and are not excluded by the table lock
/// - WRITE/DELETE on disjoint partitions still serialize on the table lock
/// - Lock order is always table lock, then partitions ascending
pub struct Engine {
    /// `None` until [`Engine::init`] (or after [`Engine::terminate`])
    table: RwLock<Option<Arc<Table>>>,
}

impl Engine {
    /// Create an engine with an empty, initialized table
    pub fn new() -> Self {
        Self {
            table: RwLock::new(Some(Arc::new(Table::new()))),
        }
    }

    /// Create an engine with no table yet
    pub fn uninitialized() -> Self {
        Self {
            table: RwLock::new(None),
        }
    }

    /// Create the table
    pub fn init(&self) -> Result<()> {
        let mut slot = self.table.write();
        if slot.is_some() {
            return Err(KvsError::AlreadyInitialized);
        }
        *slot = Some(Arc::new(Table::new()));
        tracing::debug!("KVS state initialized");
        Ok(())
    }

    /// Drop the table. Commands issued afterwards fail with
    /// `UninitializedStore`.
    pub fn terminate(&self) -> Result<()> {
        match self.table.write().take() {
            Some(_) => {
                tracing::debug!("KVS state terminated");
                Ok(())
            }
            None => Err(KvsError::UninitializedStore),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.table.read().is_some()
    }

    fn table(&self) -> Result<Arc<Table>> {
        self.table.read().clone().ok_or(KvsError::UninitializedStore)
    }

    /// Execute a command
    ///
    /// `BACKUP` and `EndOfFile` are job-level commands and must be handled
    /// by the caller.
    pub fn execute<W: Write + ?Sized>(&self, command: &Command, out: &mut W) -> Result<()> {
        match command {
            Command::Write { pairs } => self.write(pairs),
            Command::Read { keys } => self.read(keys, out),
            Command::Delete { keys } => self.delete(keys, out),
            Command::Show => self.show(out),
            Command::Wait { delay_ms } => self.wait(*delay_ms, out),
            Command::Help => {
                std::io::stdout().lock().write_all(HELP_TEXT.as_bytes())?;
                Ok(())
            }
            Command::Empty => Ok(()),
            Command::Invalid { reason } => Err(KvsError::InvalidCommand(reason.clone())),
            Command::Backup | Command::EndOfFile => Err(KvsError::InvalidCommand(format!(
                "{:?} is not a store command",
                command.command_type()
            ))),
        }
    }

    /// Insert or overwrite every pair.
    ///
    /// Pairs are applied in ascending key order; for duplicate keys the
    /// last pair in the request wins.
    pub fn write<K, V>(&self, pairs: &[(K, V)]) -> Result<()>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let table = self.table()?;
        let keys: Vec<&str> = pairs.iter().map(|(key, _)| key.as_ref()).collect();
        let plan = LockPlan::new(&keys)?;

        let table_lock = table.lock_table();
        let mut guards = plan.write(&table);
        let mut inserted = 0usize;
        guards.for_each_key_mut(|position, partition| {
            if partition.upsert(keys[position], pairs[position].1.as_ref()) {
                inserted += 1;
            }
        });
        drop(guards);
        drop(table_lock);

        tracing::trace!(pairs = pairs.len(), inserted, "write applied");
        Ok(())
    }

    /// Write `[(k,v)...]` for every key in ascending order, `KVSERROR` for
    /// absent keys
    pub fn read<K, W>(&self, keys: &[K], out: &mut W) -> Result<()>
    where
        K: AsRef<str>,
        W: Write + ?Sized,
    {
        let table = self.table()?;
        let plan = LockPlan::new(keys)?;

        let mut line = ResultLine::new();
        let guards = plan.read(&table);
        guards.for_each_key(|position, partition| {
            let key = keys[position].as_ref();
            match partition.lookup(key) {
                Some(value) => line.push(key, &value),
                None => line.push(key, KVS_ERROR),
            }
        });
        drop(guards);

        out.write_all(&line.finish())?;
        Ok(())
    }

    /// Remove every key; write `[(k,KVSMISSING)...]` only if some were
    /// absent
    pub fn delete<K, W>(&self, keys: &[K], out: &mut W) -> Result<()>
    where
        K: AsRef<str>,
        W: Write + ?Sized,
    {
        let table = self.table()?;
        let plan = LockPlan::new(keys)?;

        let mut missing = ResultLine::new();
        let table_lock = table.lock_table();
        let mut guards = plan.write(&table);
        guards.for_each_key_mut(|position, partition| {
            let key = keys[position].as_ref();
            if !partition.remove(key) {
                missing.push(key, KVS_MISSING);
            }
        });
        drop(guards);
        drop(table_lock);

        if !missing.is_empty() {
            out.write_all(&missing.finish())?;
        }
        Ok(())
    }

    /// Write one `(key, value)` line per entry
    pub fn show<W: Write + ?Sized>(&self, out: &mut W) -> Result<()> {
        let table = self.table()?;

        let mut buf = BytesMut::new();
        let table_lock = table.lock_table();
        table.for_each_entry(&table_lock, |entry| put_entry_line(&mut buf, &entry.key, &entry.value));
        drop(table_lock);

        out.write_all(&buf)?;
        Ok(())
    }

    /// Clone the table under the table lock
    pub fn snapshot(&self) -> Result<Snapshot> {
        let table = self.table()?;
        let table_lock = table.lock_table();
        let snapshot = table.snapshot(&table_lock);
        drop(table_lock);

        tracing::trace!(entries = snapshot.len(), "snapshot taken");
        Ok(snapshot)
    }

    /// Write a snapshot in `SHOW` format. Takes no locks.
    pub fn backup<W: Write + ?Sized>(snapshot: &Snapshot, out: &mut W) -> Result<()> {
        let mut buf = BytesMut::new();
        for entry in snapshot.iter() {
            put_entry_line(&mut buf, &entry.key, &entry.value);
        }
        out.write_all(&buf)?;
        Ok(())
    }

    /// Announce and sleep. A zero delay does nothing.
    pub fn wait<W: Write + ?Sized>(&self, delay_ms: u64, out: &mut W) -> Result<()> {
        if delay_ms > 0 {
            out.write_all(WAITING.as_bytes())?;
            out.flush()?;
            thread::sleep(Duration::from_millis(delay_ms));
        }
        Ok(())
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Current value of a single key
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let table = self.table()?;
        let index = partition_index(key)?;
        let value = table.read_partition(index).lookup(key);
        Ok(value)
    }

    /// Number of stored entries
    pub fn len(&self) -> Result<usize> {
        Ok(self.table()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.table()?.is_empty())
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
