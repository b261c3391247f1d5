//! Hash index implementation.

use prevail_codec::FieldValue;
use std::collections::{BTreeSet, HashMap};

/// Hash-based index from a field value to the keys holding it.
///
/// `HashIndex` answers equality lookups in O(1). Each bucket is a set, so
/// a key appears at most once per bucket, and a bucket that becomes empty
/// is dropped so bucket count tracks the number of distinct live values.
///
/// # Example
///
/// ```rust,ignore
/// let mut index = HashIndex::new();
/// index.insert(FieldValue::from("Paris"), "alice");
/// assert_eq!(index.lookup(&FieldValue::from("Paris")), vec!["alice"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HashIndex {
    /// Value to keys mapping.
    buckets: HashMap<FieldValue, BTreeSet<String>>,
    /// Total entry count.
    count: usize,
}

impl HashIndex {
    /// Creates a new empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `key` under `value`. Returns false if it was already there.
    pub fn insert(&mut self, value: FieldValue, key: &str) -> bool {
        let bucket = self.buckets.entry(value).or_default();
        if bucket.contains(key) {
            return false;
        }
        bucket.insert(key.to_owned());
        self.count += 1;
        true
    }

    /// Removes `key` from the bucket for `value`, dropping the bucket if
    /// it becomes empty. Returns true if the key was present.
    pub fn remove(&mut self, value: &FieldValue, key: &str) -> bool {
        if let Some(bucket) = self.buckets.get_mut(value) {
            if bucket.remove(key) {
                self.count -= 1;
                if bucket.is_empty() {
                    self.buckets.remove(value);
                }
                return true;
            }
        }
        false
    }

    /// Returns the keys whose field equals `value`, in key order.
    #[must_use]
    pub fn lookup(&self, value: &FieldValue) -> Vec<String> {
        self.buckets
            .get(value)
            .map(|bucket| bucket.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Returns true if any key is stored under `value`.
    #[must_use]
    pub fn contains(&self, value: &FieldValue) -> bool {
        self.buckets.contains_key(value)
    }

    /// Returns true if `key` is stored under `value`.
    #[must_use]
    pub fn contains_entry(&self, value: &FieldValue, key: &str) -> bool {
        self.buckets.get(value).is_some_and(|bucket| bucket.contains(key))
    }

    /// Iterates over `(value, keys)` buckets in unspecified order.
    pub fn buckets(&self) -> impl Iterator<Item = (&FieldValue, &BTreeSet<String>)> {
        self.buckets.iter()
    }

    /// Returns the number of distinct values.
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Returns the total number of `(value, key)` entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns true if the index is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Removes all entries.
    pub fn clear(&mut self) {
        self.buckets.clear();
        self.count = 0;
    }

    /// Rebuilds the index from `(value, key)` pairs.
    pub fn rebuild<'a, I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (FieldValue, &'a str)>,
    {
        self.clear();
        for (value, key) in entries {
            self.insert(value, key);
        }
    }
}
