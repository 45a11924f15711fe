//! Concord Storage Layer
//!
//! Implements the `ReputationStore` trait from the domain crate. The only
//! backend shipped here is [`MemoryStore`]; a document-store driver would
//! implement the same trait, in particular the atomic upsert-on-read
//! semantics of `find_or_create`.

#![warn(missing_docs)]

use concord_domain::{ReputationStore, SourceRecord, StoreError};
use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::debug;

/// In-memory reputation store.
///
/// Default backend for stateless mode and for tests. All operations take a
/// single lock acquisition, which is what makes `find_or_create` atomic.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, SourceRecord>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently held
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Whether the store holds no records
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl ReputationStore for MemoryStore {
    fn find_or_create(&self, defaults: SourceRecord) -> Result<SourceRecord, StoreError> {
        let mut records = self.records.lock();
        let record = records
            .entry(defaults.source_id.clone())
            .or_insert_with(|| {
                debug!(source_id = %defaults.source_id, "creating source record");
                defaults
            });
        Ok(record.clone())
    }

    fn get(&self, source_id: &str) -> Result<Option<SourceRecord>, StoreError> {
        Ok(self.records.lock().get(source_id).cloned())
    }

    fn put(&self, record: &SourceRecord) -> Result<(), StoreError> {
        self.records
            .lock()
            .insert(record.source_id.clone(), record.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.records.lock().clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, reputation: f64) -> SourceRecord {
        SourceRecord::with_uniform_prior(id, 4, reputation)
    }

    #[test]
    fn test_find_or_create_inserts_once() {
        let store = MemoryStore::new();
        let first = store.find_or_create(record("S1", 0.5)).unwrap();
        assert_eq!(first.reputation, 0.5);

        // A second call must return the stored record, not the new defaults
        let second = store.find_or_create(record("S1", 0.9)).unwrap();
        assert_eq!(second.reputation, 0.5);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_get_missing_is_none() {
        let store = MemoryStore::new();
        assert!(store.get("nope").unwrap().is_none());
    }

    #[test]
    fn test_put_replaces() {
        let store = MemoryStore::new();
        store.find_or_create(record("S1", 0.5)).unwrap();

        let mut updated = record("S1", 0.5);
        updated.reputation = 0.75;
        store.put(&updated).unwrap();

        let fetched = store.get("S1").unwrap().unwrap();
        assert_eq!(fetched.reputation, 0.75);
    }

    #[test]
    fn test_clear_drops_everything() {
        let store = MemoryStore::new();
        store.find_or_create(record("S1", 0.5)).unwrap();
        store.find_or_create(record("S2", 0.5)).unwrap();
        assert_eq!(store.len(), 2);

        store.clear().unwrap();
        assert!(store.is_empty());
        assert!(store.get("S1").unwrap().is_none());
    }
}
