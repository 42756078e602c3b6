//! Store Module
//!
//! The partitioned in-memory hash table.
//!
//! ## Responsibilities
//! - Bucket keys into 26 partitions by their leading character
//! - Guard each partition with its own reader-writer lock
//! - Provide a table-wide coordination lock for whole-table scans
//! - Order multi-key lock acquisition so that it can never deadlock
//!
//! ## Layout
//! ```text
//! ┌──────────────────────── Table ────────────────────────┐
//! │ table lock: RwLock<()>    (coordination, no data)     │
//! ├───────────┬───────────┬───────────┬─────┬─────────────┤
//! │ RwLock<P0>│ RwLock<P1>│ RwLock<P2>│ ... │ RwLock<P25> │
//! │  a..., 0..│  b..., 1..│  c..., 2..│     │  z...       │
//! └───────────┴───────────┴───────────┴─────┴─────────────┘
//! ```
//!
//! Partition contents are only reachable through a lock guard, so the
//! caller decides which locks to hold and for how long. Multi-key
//! operations go through [`LockPlan`] to acquire them in a global order.

mod partition;
mod table;
mod snapshot;
pub mod ordering;

pub use partition::{Entry, Partition};
pub use table::{Table, TableLock};
pub use snapshot::Snapshot;
pub use ordering::{compare_keys, LockPlan, PartitionGuards};

use crate::error::{KvsError, Result};

/// Number of partitions in the table (one per lowercase letter)
pub const TABLE_SIZE: usize = 26;

/// Partition index of a key, derived from its leading character.
///
/// `a`-`z` (any case) map to `0..26`; `0`-`9` map to `0..10`, sharing
/// partitions with `a`-`j`. Anything else cannot be stored.
pub fn partition_index(key: &str) -> Result<usize> {
    let first = key
        .as_bytes()
        .first()
        .copied()
        .ok_or_else(|| KvsError::InvalidKey(key.to_string()))?;

    match first.to_ascii_lowercase() {
        c @ b'a'..=b'z' => Ok((c - b'a') as usize),
        c @ b'0'..=b'9' => Ok((c - b'0') as usize),
        _ => Err(KvsError::InvalidKey(key.to_string())),
    }
}
