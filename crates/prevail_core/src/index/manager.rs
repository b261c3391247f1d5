//! Index manager: all secondary indexes of one database.

use crate::index::HashIndex;
use crate::record::Record;
use crate::store::RecordStore;
use crate::types::{IndexDefinition, TypeIdentity};
use prevail_codec::FieldValue;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Secondary indexes keyed by `(TypeIdentity, field)`.
///
/// # Invariants
///
/// For every stored record whose identity has an index on a field the
/// record exposes, that index holds the record's key exactly once, in the
/// bucket equal to the record's current field value. Records whose schema
/// lacks the indexed field are not indexed.
///
/// Maintaining the invariant across an update depends on ordering: the
/// old record must be removed (using its own field values) before the new
/// one is inserted. The commit path does this via
/// [`remove_record`](Self::remove_record) then
/// [`insert_record`](Self::insert_record).
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IndexManager {
    indexes: HashMap<TypeIdentity, BTreeMap<String, HashIndex>>,
}

impl IndexManager {
    /// Creates a manager with no indexes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an index and populates it from `store`.
    ///
    /// Returns false, leaving the existing index untouched, if an index
    /// for this pair already exists.
    pub fn create(&mut self, definition: &IndexDefinition, store: &RecordStore) -> bool {
        let fields = self.indexes.entry(definition.identity.clone()).or_default();
        if fields.contains_key(&definition.field) {
            return false;
        }
        let mut index = HashIndex::new();
        index.rebuild(scan(store, definition));
        fields.insert(definition.field.clone(), index);
        true
    }

    /// Returns the index for a `(identity, field)` pair.
    #[must_use]
    pub fn get(&self, identity: &TypeIdentity, field: &str) -> Option<&HashIndex> {
        self.indexes.get(identity)?.get(field)
    }

    /// Adds `record` under `key` to every index on its identity.
    pub fn insert_record(&mut self, key: &str, record: &dyn Record) {
        let Some(fields) = self.indexes.get_mut(&record.type_identity()) else {
            return;
        };
        for (field, index) in fields.iter_mut() {
            if let Some(value) = record.field(field) {
                index.insert(value, key);
            }
        }
    }

    /// Removes `key` from every index on the identity of `old`, using the
    /// field values `old` holds.
    pub fn remove_record(&mut self, key: &str, old: &dyn Record) {
        let Some(fields) = self.indexes.get_mut(&old.type_identity()) else {
            return;
        };
        for (field, index) in fields.iter_mut() {
            if let Some(value) = old.field(field) {
                index.remove(&value, key);
            }
        }
    }

    /// Returns the keys whose `field` equals `value`.
    ///
    /// A missing index or bucket yields an empty result.
    #[must_use]
    pub fn lookup(&self, identity: &TypeIdentity, field: &str, value: &FieldValue) -> Vec<String> {
        self.get(identity, field)
            .map(|index| index.lookup(value))
            .unwrap_or_default()
    }

    /// Returns every index definition, sorted.
    #[must_use]
    pub fn definitions(&self) -> Vec<IndexDefinition> {
        let mut definitions: Vec<_> = self
            .iter()
            .map(|(identity, field, _)| IndexDefinition::new(identity.clone(), field))
            .collect();
        definitions.sort();
        definitions
    }

    /// Iterates over `(identity, field, index)` in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&TypeIdentity, &str, &HashIndex)> {
        self.indexes.iter().flat_map(|(identity, fields)| {
            fields
                .iter()
                .map(move |(field, index)| (identity, field.as_str(), index))
        })
    }

    /// Installs a prebuilt index, replacing any existing one.
    pub(crate) fn install(&mut self, definition: IndexDefinition, index: HashIndex) {
        self.indexes
            .entry(definition.identity)
            .or_default()
            .insert(definition.field, index);
    }

    /// Returns the number of indexes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.indexes.values().map(BTreeMap::len).sum()
    }

    /// Returns true if there are no indexes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Repopulates every existing index from `store`.
    pub fn rebuild(&mut self, store: &RecordStore) {
        for (identity, fields) in &mut self.indexes {
            for (field, index) in fields.iter_mut() {
                let definition = IndexDefinition::new(identity.clone(), field.as_str());
                index.rebuild(scan(store, &definition));
            }
        }
    }

    /// Compares every index with what a fresh scan of `store` produces.
    #[must_use]
    pub fn verify(&self, store: &RecordStore) -> IndexReport {
        let mut report = IndexReport::default();
        for (identity, field, actual) in self.iter() {
            let definition = IndexDefinition::new(identity.clone(), field);
            let mut expected = HashIndex::new();
            expected.rebuild(scan(store, &definition));

            report.checked += 1;
            for (value, keys) in expected.buckets() {
                for key in keys {
                    if !actual.contains_entry(value, key) {
                        report.missing.push(IndexEntry::new(&definition, value, key));
                    }
                }
            }
            for (value, keys) in actual.buckets() {
                for key in keys {
                    if !expected.contains_entry(value, key) {
                        report.stale.push(IndexEntry::new(&definition, value, key));
                    }
                }
            }
        }
        report
    }
}

/// Yields `(value, key)` for every record in `store` covered by `definition`.
fn scan<'a>(
    store: &'a RecordStore,
    definition: &'a IndexDefinition,
) -> impl Iterator<Item = (FieldValue, &'a str)> + 'a {
    store.iter().filter_map(move |(key, record)| {
        if record.type_identity() != definition.identity {
            return None;
        }
        record.field(&definition.field).map(|value| (value, key))
    })
}

/// One `(index, value, key)` entry reported by [`IndexManager::verify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    /// Index holding, or missing, the entry.
    pub definition: IndexDefinition,
    /// Bucket value.
    pub value: FieldValue,
    /// Record key.
    pub key: String,
}

impl IndexEntry {
    fn new(definition: &IndexDefinition, value: &FieldValue, key: &str) -> Self {
        Self {
            definition: definition.clone(),
            value: value.clone(),
            key: key.to_owned(),
        }
    }
}

impl fmt::Display for IndexEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}] -> {}", self.definition, self.value, self.key)
    }
}

/// Result of checking indexes against the record store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexReport {
    /// Number of indexes checked.
    pub checked: usize,
    /// Entries a fresh scan produces that the index lacks.
    pub missing: Vec<IndexEntry>,
    /// Entries the index holds that a fresh scan does not produce.
    pub stale: Vec<IndexEntry>,
}

impl IndexReport {
    /// Returns true if no index diverges from the store.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.missing.is_empty() && self.stale.is_empty()
    }
}
