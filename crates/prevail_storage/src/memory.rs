//! In-memory artifact store for testing.

use crate::backend::{Artifact, ArtifactStore};
use crate::error::{StorageError, StorageResult};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Default)]
struct Slots {
    live: HashMap<Artifact, Vec<u8>>,
    staged: HashMap<Artifact, Vec<u8>>,
}

/// An in-memory artifact store.
///
/// This backend keeps artifacts in memory and is suitable for:
/// - Unit tests
/// - Integration tests
/// - Ephemeral stores that don't need persistence
///
/// Clones share the same slots, so a test can keep one handle, hand a
/// clone to a database, and later reopen another database from the same
/// "disk" or inspect and corrupt what was written.
///
/// # Example
///
/// ```rust
/// use prevail_storage::{Artifact, ArtifactStore, InMemoryBackend};
///
/// let disk = InMemoryBackend::new();
/// let mut writer = disk.clone();
/// writer.stage(Artifact::Data, b"bytes").unwrap();
/// writer.publish(Artifact::Data).unwrap();
///
/// assert_eq!(disk.live(Artifact::Data).unwrap(), b"bytes");
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryBackend {
    slots: Arc<RwLock<Slots>>,
}

impl InMemoryBackend {
    /// Creates a new empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the live artifact.
    #[must_use]
    pub fn live(&self, artifact: Artifact) -> Option<Vec<u8>> {
        self.slots.read().live.get(&artifact).cloned()
    }

    /// Returns true if a staged copy is pending.
    #[must_use]
    pub fn has_staged(&self, artifact: Artifact) -> bool {
        self.slots.read().staged.contains_key(&artifact)
    }

    /// Overwrites the live artifact directly, bypassing staging.
    ///
    /// Useful for simulating corruption and crash leftovers.
    pub fn put_live(&self, artifact: Artifact, data: Vec<u8>) {
        self.slots.write().live.insert(artifact, data);
    }

    /// Clears all artifacts.
    pub fn clear(&self) {
        let mut slots = self.slots.write();
        slots.live.clear();
        slots.staged.clear();
    }
}

impl ArtifactStore for InMemoryBackend {
    fn read(&self, artifact: Artifact) -> StorageResult<Option<Vec<u8>>> {
        Ok(self.live(artifact))
    }

    fn stage(&mut self, artifact: Artifact, data: &[u8]) -> StorageResult<()> {
        self.slots.write().staged.insert(artifact, data.to_vec());
        Ok(())
    }

    fn publish(&mut self, artifact: Artifact) -> StorageResult<()> {
        let mut slots = self.slots.write();
        let data = slots
            .staged
            .remove(&artifact)
            .ok_or(StorageError::NothingStaged(artifact))?;
        slots.live.insert(artifact, data);
        Ok(())
    }

    fn discard(&mut self, artifact: Artifact) -> StorageResult<()> {
        self.slots.write().staged.remove(&artifact);
        Ok(())
    }

    fn remove(&mut self, artifact: Artifact) -> StorageResult<()> {
        self.slots.write().live.remove(&artifact);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_new_is_empty() {
        let backend = InMemoryBackend::new();
        assert!(backend.read(Artifact::Data).unwrap().is_none());
        assert!(backend.read(Artifact::Index).unwrap().is_none());
    }

    #[test]
    fn memory_stage_then_publish() {
        let mut backend = InMemoryBackend::new();

        backend.stage(Artifact::Data, b"hello").unwrap();
        assert!(backend.has_staged(Artifact::Data));
        assert!(backend.read(Artifact::Data).unwrap().is_none());

        backend.publish(Artifact::Data).unwrap();
        assert!(!backend.has_staged(Artifact::Data));
        assert_eq!(backend.read(Artifact::Data).unwrap().unwrap(), b"hello");
    }

    #[test]
    fn memory_publish_without_stage_fails() {
        let mut backend = InMemoryBackend::new();
        let result = backend.publish(Artifact::Data);
        assert!(matches!(result, Err(StorageError::NothingStaged(Artifact::Data))));
    }

    #[test]
    fn memory_discard_keeps_live() {
        let mut backend = InMemoryBackend::new();
        backend.put_live(Artifact::Index, b"old".to_vec());

        backend.stage(Artifact::Index, b"new").unwrap();
        backend.discard(Artifact::Index).unwrap();

        assert_eq!(backend.live(Artifact::Index).unwrap(), b"old");
        assert!(!backend.has_staged(Artifact::Index));
    }

    #[test]
    fn memory_clones_share_state() {
        let disk = InMemoryBackend::new();
        let mut writer = disk.clone();

        writer.stage(Artifact::Index, b"idx").unwrap();
        writer.publish(Artifact::Index).unwrap();

        assert_eq!(disk.live(Artifact::Index).unwrap(), b"idx");
    }

    #[test]
    fn memory_remove_and_clear() {
        let mut backend = InMemoryBackend::new();
        backend.put_live(Artifact::Data, b"d".to_vec());
        backend.put_live(Artifact::Index, b"i".to_vec());

        backend.remove(Artifact::Index).unwrap();
        assert!(backend.live(Artifact::Index).is_none());

        backend.clear();
        assert!(backend.live(Artifact::Data).is_none());
    }
}
