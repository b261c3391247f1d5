//! Artifact store trait definition.

use crate::error::StorageResult;
use std::fmt;

/// One of the two artifacts that make up a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Artifact {
    /// The full key → record mapping.
    Data,
    /// The full index structure.
    Index,
}

impl Artifact {
    /// Both artifacts, in publish order.
    pub const ALL: [Artifact; 2] = [Artifact::Data, Artifact::Index];
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Artifact::Data => f.write_str("data"),
            Artifact::Index => f.write_str("index"),
        }
    }
}

/// A store for whole-snapshot artifacts with atomic replacement.
///
/// Artifact stores are **opaque byte stores**: they never interpret the
/// bytes they hold. Writes go through a two-step protocol:
///
/// 1. [`stage`](ArtifactStore::stage) writes a complete new copy beside
///    the live one. The live artifact is untouched.
/// 2. [`publish`](ArtifactStore::publish) atomically replaces the live
///    artifact with the staged copy.
///
/// # Invariants
///
/// - A reader never observes a partially written live artifact
/// - A failed `stage` leaves the live artifact intact
/// - `discard` after a failed `stage` leaves no staged copy behind
pub trait ArtifactStore: Send + Sync {
    /// Reads the live copy of an artifact.
    ///
    /// Returns `Ok(None)` if the artifact has never been published.
    ///
    /// # Errors
    ///
    /// Returns an error if the artifact exists but cannot be read.
    fn read(&self, artifact: Artifact) -> StorageResult<Option<Vec<u8>>>;

    /// Writes a complete staged copy of an artifact.
    ///
    /// # Errors
    ///
    /// Returns an error if the staged copy cannot be written in full.
    fn stage(&mut self, artifact: Artifact, data: &[u8]) -> StorageResult<()>;

    /// Atomically replaces the live artifact with its staged copy.
    ///
    /// # Errors
    ///
    /// Returns an error if nothing is staged or the replacement fails.
    fn publish(&mut self, artifact: Artifact) -> StorageResult<()>;

    /// Drops the staged copy of an artifact, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the staged copy exists but cannot be removed.
    fn discard(&mut self, artifact: Artifact) -> StorageResult<()>;

    /// Removes the live copy of an artifact, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the live copy exists but cannot be removed.
    fn remove(&mut self, artifact: Artifact) -> StorageResult<()>;
}

impl<S: ArtifactStore + ?Sized> ArtifactStore for Box<S> {
    fn read(&self, artifact: Artifact) -> StorageResult<Option<Vec<u8>>> {
        (**self).read(artifact)
    }

    fn stage(&mut self, artifact: Artifact, data: &[u8]) -> StorageResult<()> {
        (**self).stage(artifact, data)
    }

    fn publish(&mut self, artifact: Artifact) -> StorageResult<()> {
        (**self).publish(artifact)
    }

    fn discard(&mut self, artifact: Artifact) -> StorageResult<()> {
        (**self).discard(artifact)
    }

    fn remove(&mut self, artifact: Artifact) -> StorageResult<()> {
        (**self).remove(artifact)
    }
}
