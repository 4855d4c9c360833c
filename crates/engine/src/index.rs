//! In-memory id → record map
//!
//! `MemoryIndex` is the authoritative in-process view of the dataset. It is
//! guarded by a single `RwLock`: lookups and enumeration run concurrently,
//! while `put`, `remove` and `clear` are totally ordered against each other.
//! Every enumeration is a copy taken under the read lock, so callers never
//! observe a half-applied mutation.

use parking_lot::RwLock;
use std::collections::HashMap;
use vecmini_core::{VectorId, VectorRecord};

/// Concurrent map from id to record
#[derive(Debug, Default)]
pub struct MemoryIndex {
    records: RwLock<HashMap<VectorId, VectorRecord>>,
}

impl MemoryIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite by id, returning the replaced record
    pub fn put(&self, record: VectorRecord) -> Option<VectorRecord> {
        self.records.write().insert(record.id().clone(), record)
    }

    /// Insert many records in one critical section
    pub fn extend<I>(&self, records: I)
    where
        I: IntoIterator<Item = VectorRecord>,
    {
        let mut map = self.records.write();
        for record in records {
            map.insert(record.id().clone(), record);
        }
    }

    /// Look up a record by id
    pub fn get(&self, id: &str) -> Option<VectorRecord> {
        self.records.read().get(id).cloned()
    }

    /// Remove a record, returning it if it was present
    pub fn remove(&self, id: &str) -> Option<VectorRecord> {
        self.records.write().remove(id)
    }

    /// True if `id` is present
    pub fn contains(&self, id: &str) -> bool {
        self.records.read().contains_key(id)
    }

    /// Copy of every record, in no particular order
    pub fn all(&self) -> Vec<VectorRecord> {
        self.records.read().values().cloned().collect()
    }

    /// Every id, sorted ascending
    pub fn ids(&self) -> Vec<VectorId> {
        let mut ids: Vec<VectorId> = self.records.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// True if the index holds no records
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Remove every record
    pub fn clear(&self) {
        self.records.write().clear();
    }
}
