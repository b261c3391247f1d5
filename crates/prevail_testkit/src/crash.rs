//! Fault injection for snapshot saves.
//!
//! [`FaultyBackend`] wraps an [`InMemoryBackend`] and fails one chosen
//! step of the save protocol, so tests can check what survives a failed
//! or interrupted save.
//!
//! ## Fault points
//!
//! 1. **Stage data** - nothing new reaches the live artifacts
//! 2. **Stage index** - staged data is discarded, live artifacts intact
//! 3. **Publish data** - both staged, neither published
//! 4. **Publish index** - new data published beside the old index
//!
//! ## Usage
//!
//! ```rust,ignore
//! let faulty = FaultyBackend::new(InMemoryBackend::new());
//! let db = Database::open_with_backend(config, faulty.clone())?;
//! faulty.arm(FaultPoint::PublishIndex);
//! assert!(db.set("k", value).is_err());
//! ```

use prevail_storage::{Artifact, ArtifactStore, InMemoryBackend, StorageError, StorageResult};
use std::io;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

/// Step of the save protocol at which to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultPoint {
    /// Fail staging the data artifact.
    StageData,
    /// Fail staging the index artifact.
    StageIndex,
    /// Fail publishing the data artifact.
    PublishData,
    /// Fail publishing the index artifact.
    PublishIndex,
}

impl FaultPoint {
    /// Every fault point, in protocol order.
    pub const ALL: [FaultPoint; 4] = [
        FaultPoint::StageData,
        FaultPoint::StageIndex,
        FaultPoint::PublishData,
        FaultPoint::PublishIndex,
    ];

    fn code(self) -> u8 {
        match self {
            FaultPoint::StageData => 1,
            FaultPoint::StageIndex => 2,
            FaultPoint::PublishData => 3,
            FaultPoint::PublishIndex => 4,
        }
    }
}

const DISARMED: u8 = 0;

#[derive(Debug, Default)]
struct Trigger {
    armed: AtomicU8,
    persistent: AtomicBool,
    fired: AtomicBool,
}

/// An in-memory backend that fails at a chosen point.
///
/// Clones share both the trigger and the underlying slots. A fault fires
/// once and disarms itself unless armed with [`arm_persistent`].
///
/// [`arm_persistent`]: FaultyBackend::arm_persistent
#[derive(Debug, Clone, Default)]
pub struct FaultyBackend {
    inner: InMemoryBackend,
    trigger: Arc<Trigger>,
}

impl FaultyBackend {
    /// Wraps `inner`.
    pub fn new(inner: InMemoryBackend) -> Self {
        Self {
            inner,
            trigger: Arc::default(),
        }
    }

    /// Fails the next time `point` is reached.
    pub fn arm(&self, point: FaultPoint) {
        self.trigger.persistent.store(false, Ordering::SeqCst);
        self.trigger.armed.store(point.code(), Ordering::SeqCst);
    }

    /// Fails every time `point` is reached until [`disarm`](Self::disarm).
    pub fn arm_persistent(&self, point: FaultPoint) {
        self.trigger.persistent.store(true, Ordering::SeqCst);
        self.trigger.armed.store(point.code(), Ordering::SeqCst);
    }

    /// Stops injecting faults.
    pub fn disarm(&self) {
        self.trigger.armed.store(DISARMED, Ordering::SeqCst);
    }

    /// Returns whether a fault has fired since creation or [`reset`](Self::reset).
    pub fn has_fired(&self) -> bool {
        self.trigger.fired.load(Ordering::SeqCst)
    }

    /// Disarms and clears the fired flag.
    pub fn reset(&self) {
        self.disarm();
        self.trigger.fired.store(false, Ordering::SeqCst);
    }

    /// Returns the shared in-memory slots.
    pub fn disk(&self) -> &InMemoryBackend {
        &self.inner
    }

    fn check(&self, point: FaultPoint) -> StorageResult<()> {
        if self.trigger.armed.load(Ordering::SeqCst) != point.code() {
            return Ok(());
        }
        if !self.trigger.persistent.load(Ordering::SeqCst) {
            self.disarm();
        }
        self.trigger.fired.store(true, Ordering::SeqCst);
        Err(StorageError::Io(io::Error::new(
            io::ErrorKind::Other,
            format!("injected fault at {point:?}"),
        )))
    }
}

impl ArtifactStore for FaultyBackend {
    fn read(&self, artifact: Artifact) -> StorageResult<Option<Vec<u8>>> {
        self.inner.read(artifact)
    }

    fn stage(&mut self, artifact: Artifact, data: &[u8]) -> StorageResult<()> {
        self.check(match artifact {
            Artifact::Data => FaultPoint::StageData,
            Artifact::Index => FaultPoint::StageIndex,
        })?;
        self.inner.stage(artifact, data)
    }

    fn publish(&mut self, artifact: Artifact) -> StorageResult<()> {
        self.check(match artifact {
            Artifact::Data => FaultPoint::PublishData,
            Artifact::Index => FaultPoint::PublishIndex,
        })?;
        self.inner.publish(artifact)
    }

    fn discard(&mut self, artifact: Artifact) -> StorageResult<()> {
        self.inner.discard(artifact)
    }

    fn remove(&mut self, artifact: Artifact) -> StorageResult<()> {
        self.inner.remove(artifact)
    }
}
