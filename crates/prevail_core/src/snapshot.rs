//! Snapshot persistence.
//!
//! A snapshot is two independent artifacts, each a versioned CBOR
//! envelope:
//!
//! ```text
//! data  = "PVDT" 0x01 DataSnapshot  { records: [{ key, identity, payload }] }
//! index = "PVIX" 0x01 IndexSnapshot { indexes: [{ definition, buckets: [(value, [key])] }] }
//! ```
//!
//! Records and buckets are written in sorted order, so an unchanged state
//! always encodes to the same bytes.
//!
//! ## Save protocol
//!
//! 1. Encode both artifacts in memory
//! 2. Stage data, then stage index
//! 3. If either stage fails, discard both staged copies and stop
//! 4. Publish data, then publish index
//!
//! A crash between the two publishes leaves new data beside an old but
//! readable index. Load cannot tell that apart from a current index, so
//! that window stays open until the next successful save; a missing or
//! undecodable index is rebuilt at load.

use crate::error::{CoreError, CoreResult};
use crate::index::{HashIndex, IndexManager};
use crate::registry::Registry;
use crate::store::RecordStore;
use crate::types::{IndexDefinition, TypeIdentity};
use prevail_codec::{decode_envelope, encode_envelope, FieldValue, Payload};
use prevail_storage::{Artifact, ArtifactStore};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Magic bytes for the data artifact: "PVDT".
pub const DATA_MAGIC: [u8; 4] = *b"PVDT";

/// Magic bytes for the index artifact: "PVIX".
pub const INDEX_MAGIC: [u8; 4] = *b"PVIX";

/// Current artifact format version.
pub const FORMAT_VERSION: u8 = 1;

/// One record as written to the data artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    /// Record key.
    pub key: String,
    /// Record type, used to pick a decoder on load.
    pub identity: TypeIdentity,
    /// Serialized record.
    pub payload: Payload,
}

/// Contents of the data artifact.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataSnapshot {
    /// Every stored record, sorted by key.
    pub records: Vec<StoredRecord>,
}

impl DataSnapshot {
    /// Captures the store.
    ///
    /// # Errors
    ///
    /// Returns a codec error if a record cannot be serialized.
    pub fn capture(store: &RecordStore) -> CoreResult<Self> {
        let mut records = store
            .iter()
            .map(|(key, record)| {
                Ok(StoredRecord {
                    key: key.to_owned(),
                    identity: record.type_identity(),
                    payload: record.to_payload()?,
                })
            })
            .collect::<CoreResult<Vec<_>>>()?;
        records.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(Self { records })
    }

    /// Decodes the artifact bytes without materializing records.
    ///
    /// # Errors
    ///
    /// Returns a codec error if the bytes are not a data artifact.
    pub fn decode(bytes: &[u8]) -> CoreResult<Self> {
        Ok(decode_envelope(DATA_MAGIC, FORMAT_VERSION, bytes)?)
    }

    /// Encodes the artifact bytes.
    ///
    /// # Errors
    ///
    /// Returns a codec error if encoding fails.
    pub fn encode(&self) -> CoreResult<Vec<u8>> {
        Ok(encode_envelope(DATA_MAGIC, FORMAT_VERSION, self)?)
    }

    /// Materializes the records through `registry`.
    ///
    /// # Errors
    ///
    /// Returns `UnknownRecordType` for an unregistered identity, a codec
    /// error for a payload that does not match its type, and
    /// `InvalidFormat` for a duplicated key.
    pub fn restore(self, registry: &Registry) -> CoreResult<RecordStore> {
        let mut store = RecordStore::new();
        for stored in self.records {
            let record = registry.decode(&stored.identity, &stored.payload)?;
            if store.put(stored.key.clone(), record).is_some() {
                return Err(CoreError::invalid_format(format!(
                    "duplicate key in data artifact: {}",
                    stored.key
                )));
            }
        }
        Ok(store)
    }
}

/// One index as written to the index artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedIndex {
    /// Which index this is.
    pub definition: IndexDefinition,
    /// `(value, keys)` buckets, sorted by value; keys sorted.
    pub buckets: Vec<(FieldValue, Vec<String>)>,
}

/// Contents of the index artifact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSnapshot {
    /// Every index, sorted by definition.
    pub indexes: Vec<PersistedIndex>,
}

impl IndexSnapshot {
    /// Captures every index.
    #[must_use]
    pub fn capture(indexes: &IndexManager) -> Self {
        let mut persisted: Vec<_> = indexes
            .iter()
            .map(|(identity, field, index)| {
                let mut buckets: Vec<_> = index
                    .buckets()
                    .map(|(value, keys)| (value.clone(), keys.iter().cloned().collect()))
                    .collect();
                buckets.sort_by(|a: &(FieldValue, Vec<String>), b| a.0.cmp(&b.0));
                PersistedIndex {
                    definition: IndexDefinition::new(identity.clone(), field),
                    buckets,
                }
            })
            .collect();
        persisted.sort_by(|a, b| a.definition.cmp(&b.definition));
        Self { indexes: persisted }
    }

    /// Decodes the artifact bytes.
    ///
    /// # Errors
    ///
    /// Returns a codec error if the bytes are not an index artifact.
    pub fn decode(bytes: &[u8]) -> CoreResult<Self> {
        Ok(decode_envelope(INDEX_MAGIC, FORMAT_VERSION, bytes)?)
    }

    /// Encodes the artifact bytes.
    ///
    /// # Errors
    ///
    /// Returns a codec error if encoding fails.
    pub fn encode(&self) -> CoreResult<Vec<u8>> {
        Ok(encode_envelope(INDEX_MAGIC, FORMAT_VERSION, self)?)
    }

    /// Rebuilds the in-memory index structures.
    ///
    /// # Errors
    ///
    /// Returns `InvalidFormat` if an index appears twice.
    pub fn restore(self) -> CoreResult<IndexManager> {
        let mut manager = IndexManager::new();
        let mut seen = HashSet::new();
        for persisted in self.indexes {
            if !seen.insert(persisted.definition.clone()) {
                return Err(CoreError::invalid_format(format!(
                    "duplicate index in index artifact: {}",
                    persisted.definition
                )));
            }
            let mut index = HashIndex::new();
            for (value, keys) in persisted.buckets {
                for key in &keys {
                    index.insert(value.clone(), key);
                }
            }
            manager.install(persisted.definition, index);
        }
        Ok(manager)
    }
}

/// Outcome of reading the index artifact.
#[derive(Debug)]
pub enum IndexLoad {
    /// The artifact decoded cleanly.
    Loaded(IndexManager),
    /// No index artifact exists.
    Missing,
    /// The artifact exists but could not be decoded.
    Corrupt(CoreError),
}

/// Writes both artifacts for `store` and `indexes`.
///
/// On a stage failure both staged copies are discarded and the live
/// artifacts are left as they were.
///
/// # Errors
///
/// Returns the encode, stage, or publish error.
pub fn save<S>(backend: &mut S, store: &RecordStore, indexes: &IndexManager) -> CoreResult<()>
where
    S: ArtifactStore + ?Sized,
{
    let data = DataSnapshot::capture(store)?.encode()?;
    let index = IndexSnapshot::capture(indexes).encode()?;

    let staged = backend
        .stage(Artifact::Data, &data)
        .and_then(|()| backend.stage(Artifact::Index, &index));
    if let Err(err) = staged {
        for artifact in Artifact::ALL {
            if let Err(discard_err) = backend.discard(artifact) {
                warn!(%artifact, error = %discard_err, "failed to discard staged artifact");
            }
        }
        return Err(err.into());
    }

    backend.publish(Artifact::Data)?;
    backend.publish(Artifact::Index)?;

    debug!(
        records = store.len(),
        indexes = indexes.len(),
        data_bytes = data.len(),
        index_bytes = index.len(),
        "snapshot saved"
    );
    Ok(())
}

/// Reads the data artifact. `Ok(None)` means no snapshot was ever saved.
///
/// # Errors
///
/// Returns storage, decode, and registry errors; a corrupt data artifact
/// is fatal.
pub fn load_data<S>(backend: &S, registry: &Registry) -> CoreResult<Option<RecordStore>>
where
    S: ArtifactStore + ?Sized,
{
    let Some(bytes) = backend.read(Artifact::Data)? else {
        return Ok(None);
    };
    let store = DataSnapshot::decode(&bytes)?.restore(registry)?;
    debug!(records = store.len(), "data artifact loaded");
    Ok(Some(store))
}

/// Reads the index artifact.
///
/// # Errors
///
/// Returns an error only if the artifact cannot be read; decode failures
/// are reported as [`IndexLoad::Corrupt`].
pub fn load_indexes<S>(backend: &S) -> CoreResult<IndexLoad>
where
    S: ArtifactStore + ?Sized,
{
    let Some(bytes) = backend.read(Artifact::Index)? else {
        return Ok(IndexLoad::Missing);
    };
    match IndexSnapshot::decode(&bytes).and_then(IndexSnapshot::restore) {
        Ok(indexes) => {
            debug!(indexes = indexes.len(), "index artifact loaded");
            Ok(IndexLoad::Loaded(indexes))
        }
        Err(err) => Ok(IndexLoad::Corrupt(err)),
    }
}
