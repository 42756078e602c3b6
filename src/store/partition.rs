//! Partition implementation
//!
//! An unordered list of entries. New keys go to the head, overwrites
//! stay in place.

use std::collections::VecDeque;

/// A stored key/value pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub key: String,
    pub value: String,
}

impl Entry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// One bucket of the table
///
/// Keys are matched byte-for-byte: `Apple` and `apple` land in the same
/// partition but are distinct entries.
#[derive(Debug, Clone, Default)]
pub struct Partition {
    /// Head first: the most recently inserted key is at the front
    entries: VecDeque<Entry>,
}

impl Partition {
    /// Create a new empty partition
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the value stored under `key`
    pub fn lookup(&self, key: &str) -> Option<String> {
        self.entries
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| entry.value.clone())
    }

    /// Insert or overwrite. Returns `true` if the key was inserted.
    pub fn upsert(&mut self, key: &str, value: &str) -> bool {
        if let Some(entry) = self.entries.iter_mut().find(|entry| entry.key == key) {
            entry.value.clear();
            entry.value.push_str(value);
            return false;
        }

        self.entries.push_front(Entry::new(key, value));
        true
    }

    /// Remove `key`. Returns `false` if it was absent.
    pub fn remove(&mut self, key: &str) -> bool {
        match self.entries.iter().position(|entry| entry.key == key) {
            Some(pos) => {
                self.entries.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Entries, head first
    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
