//! Keyed record store.

use crate::record::Record;
use std::collections::HashMap;
use std::sync::Arc;

/// The authoritative key → record mapping.
///
/// The store does no locking of its own; the database guards it together
/// with the index manager behind a single reader/writer lock. Only the
/// commit path mutates it.
#[derive(Debug, Default)]
pub struct RecordStore {
    records: HashMap<String, Arc<dyn Record>>,
}

impl RecordStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the record stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Arc<dyn Record>> {
        self.records.get(key)
    }

    /// Returns true if `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.records.contains_key(key)
    }

    /// Stores `record` under `key`, returning the replaced record.
    pub(crate) fn put(&mut self, key: String, record: Arc<dyn Record>) -> Option<Arc<dyn Record>> {
        self.records.insert(key, record)
    }

    /// Removes `key`, returning its record.
    pub(crate) fn remove(&mut self, key: &str) -> Option<Arc<dyn Record>> {
        self.records.remove(key)
    }

    /// Iterates over all entries in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn Record>)> {
        self.records.iter().map(|(key, record)| (key.as_str(), record))
    }

    /// Returns the number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
