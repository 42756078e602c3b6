//! Table implementation
//!
//! Fixed array of lock-guarded partitions plus the table-wide lock.

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{Entry, Partition, Snapshot, TABLE_SIZE};

/// The partitioned hash table
///
/// ## Locking
/// - `partitions[i]`: guards the entries of partition `i`
/// - `table_lock`: guards no data. Held in write mode by `WRITE`,
///   `DELETE`, `SHOW` and snapshot cloning so that those never interleave.
///   `READ` does not take it.
///
/// Lock order is always `table_lock` first, then partitions in ascending
/// index order.
pub struct Table {
    partitions: [RwLock<Partition>; TABLE_SIZE],
    table_lock: RwLock<()>,
}

/// Proof that the table-wide lock is held in write mode
pub struct TableLock<'a> {
    table: &'a Table,
    _guard: RwLockWriteGuard<'a, ()>,
}

impl Table {
    /// Create a new empty table
    pub fn new() -> Self {
        Self {
            partitions: std::array::from_fn(|_| RwLock::new(Partition::new())),
            table_lock: RwLock::new(()),
        }
    }

    /// Acquire the table-wide lock in write mode
    pub fn lock_table(&self) -> TableLock<'_> {
        TableLock {
            table: self,
            _guard: self.table_lock.write(),
        }
    }

    /// Read-lock a single partition
    pub fn read_partition(&self, index: usize) -> RwLockReadGuard<'_, Partition> {
        self.partitions[index].read()
    }

    /// Read-lock a single partition if no writer holds it.
    ///
    /// Lets callers observe whether a partition is currently write-locked.
    pub fn try_read_partition(&self, index: usize) -> Option<RwLockReadGuard<'_, Partition>> {
        self.partitions[index].try_read()
    }

    /// Write-lock a single partition
    pub fn write_partition(&self, index: usize) -> RwLockWriteGuard<'_, Partition> {
        self.partitions[index].write()
    }

    /// Visit every entry, partition index ascending, head first within a
    /// partition.
    ///
    /// Requires the table-wide lock, so no writer can be between partitions
    /// while the traversal runs. Partitions are read-locked one at a time;
    /// concurrent `READ`s are never blocked.
    pub fn for_each_entry<F>(&self, lock: &TableLock<'_>, mut visitor: F)
    where
        F: FnMut(&Entry),
    {
        debug_assert!(std::ptr::eq(lock.table, self), "table lock belongs to another table");

        for partition in &self.partitions {
            let guard = partition.read();
            guard.iter().for_each(&mut visitor);
        }
    }

    /// Clone every entry in traversal order
    pub fn snapshot(&self, lock: &TableLock<'_>) -> Snapshot {
        let mut entries = Vec::new();
        self.for_each_entry(lock, |entry| entries.push(entry.clone()));
        Snapshot::new(entries)
    }

    /// Total number of entries (locks each partition briefly)
    pub fn len(&self) -> usize {
        self.partitions.iter().map(|p| p.read().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.partitions.iter().all(|p| p.read().is_empty())
    }
}

impl Default for Table {
    fn default() -> Self {
        Self::new()
    }
}
