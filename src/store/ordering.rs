//! Lock ordering for multi-key operations
//!
//! Every multi-key operation visits its keys in ascending case-insensitive
//! order and holds the locks of all partitions it touches until it is done.
//!
//! ## Deadlock freedom
//! Partition locks are always taken in ascending partition index, each at
//! most once, and released in descending order. With one global order no
//! two operations can each hold a lock the other is waiting for.
//!
//! For purely alphabetic keys the sorted key walk already reaches
//! partitions in ascending order. Digit-led keys share partitions `0..10`
//! but sort before every letter, so the plan takes all of its partition
//! locks up front in index order instead of lazily during the walk.
//!
//! ## Visible effect
//! `READ` and `DELETE` output follows the sorted key order, not the
//! request order.

use std::cmp::Ordering;
use std::ops::{Deref, DerefMut};

use parking_lot::{RwLockReadGuard, RwLockWriteGuard};

use super::{partition_index, Partition, Table, TABLE_SIZE};
use crate::error::Result;

/// Case-insensitive ASCII comparison (`strcasecmp` ordering)
pub fn compare_keys(a: &str, b: &str) -> Ordering {
    a.bytes()
        .map(|c| c.to_ascii_lowercase())
        .cmp(b.bytes().map(|c| c.to_ascii_lowercase()))
}

/// One key of a plan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    /// Position of the key in the request
    pub position: usize,

    /// Partition the key lives in
    pub partition: usize,
}

/// Processing order and lock set for a list of keys
#[derive(Debug, Clone)]
pub struct LockPlan {
    /// Keys in ascending case-insensitive order (stable for equal keys)
    steps: Vec<Step>,

    /// Distinct partitions touched, ascending
    partitions: Vec<usize>,
}

impl LockPlan {
    /// Build a plan for `keys`.
    ///
    /// Fails with `InvalidKey` if any key cannot be mapped to a partition.
    /// Duplicate keys are kept and visited in request order.
    pub fn new<K: AsRef<str>>(keys: &[K]) -> Result<Self> {
        let mut steps = keys
            .iter()
            .enumerate()
            .map(|(position, key)| {
                Ok(Step {
                    position,
                    partition: partition_index(key.as_ref())?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        steps.sort_by(|a, b| compare_keys(keys[a.position].as_ref(), keys[b.position].as_ref()));

        let mut partitions: Vec<usize> = steps.iter().map(|step| step.partition).collect();
        partitions.sort_unstable();
        partitions.dedup();

        Ok(Self { steps, partitions })
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn partitions(&self) -> &[usize] {
        &self.partitions
    }

    /// Read-lock every partition of the plan
    pub fn read<'t>(&self, table: &'t Table) -> PartitionGuards<'_, RwLockReadGuard<'t, Partition>> {
        PartitionGuards::acquire(self, |index| table.read_partition(index))
    }

    /// Write-lock every partition of the plan
    pub fn write<'t>(&self, table: &'t Table) -> PartitionGuards<'_, RwLockWriteGuard<'t, Partition>> {
        PartitionGuards::acquire(self, |index| table.write_partition(index))
    }
}

/// Partition locks held on behalf of a [`LockPlan`]
///
/// Dropping it releases the locks in descending partition order.
pub struct PartitionGuards<'p, G> {
    plan: &'p LockPlan,
    slots: Vec<Option<G>>,
}

impl<'p, G> PartitionGuards<'p, G> {
    fn acquire(plan: &'p LockPlan, mut lock: impl FnMut(usize) -> G) -> Self {
        let mut slots: Vec<Option<G>> = (0..TABLE_SIZE).map(|_| None).collect();
        for &index in &plan.partitions {
            slots[index] = Some(lock(index));
        }
        tracing::trace!(partitions = ?plan.partitions, "partition locks acquired");
        Self { plan, slots }
    }

    /// Partitions currently held, ascending
    #[cfg(test)]
    fn held(&self) -> Vec<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|_| index))
            .collect()
    }
}

impl<G: Deref<Target = Partition>> PartitionGuards<'_, G> {
    /// Call `f(position, partition)` for every key, in plan order
    pub fn for_each_key<F>(&self, mut f: F)
    where
        F: FnMut(usize, &Partition),
    {
        for step in &self.plan.steps {
            if let Some(guard) = &self.slots[step.partition] {
                f(step.position, &**guard);
            } else {
                debug_assert!(false, "partition {} not locked", step.partition);
            }
        }
    }
}

impl<G: DerefMut<Target = Partition>> PartitionGuards<'_, G> {
    /// Call `f(position, partition)` for every key, in plan order, with
    /// mutable access
    pub fn for_each_key_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(usize, &mut Partition),
    {
        for step in &self.plan.steps {
            if let Some(guard) = &mut self.slots[step.partition] {
                f(step.position, &mut **guard);
            } else {
                debug_assert!(false, "partition {} not locked", step.partition);
            }
        }
    }
}

impl<G> Drop for PartitionGuards<'_, G> {
    fn drop(&mut self) {
        for slot in self.slots.iter_mut().rev() {
            slot.take();
        }
    }
}
