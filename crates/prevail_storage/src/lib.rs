//! # Prevail Storage
//!
//! Snapshot artifact storage for Prevail.
//!
//! This crate provides the lowest-level persistence abstraction. Artifact
//! stores are **opaque byte stores** - they do not interpret the snapshots
//! they hold.
//!
//! ## Design Principles
//!
//! - Every write is a whole artifact, never a partial update
//! - Writes are staged first and then published atomically
//! - No knowledge of record, index, or envelope formats
//! - Must be `Send + Sync` for concurrent access
//!
//! ## Available Backends
//!
//! - [`FileBackend`] - write-temp-then-rename on the local file system
//! - [`InMemoryBackend`] - for testing and ephemeral stores
//!
//! ## Example
//!
//! ```rust
//! use prevail_storage::{Artifact, ArtifactStore, InMemoryBackend};
//!
//! let mut backend = InMemoryBackend::new();
//! backend.stage(Artifact::Data, b"hello world").unwrap();
//! backend.publish(Artifact::Data).unwrap();
//! assert_eq!(backend.read(Artifact::Data).unwrap().unwrap(), b"hello world");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::{Artifact, ArtifactStore};
pub use error::{StorageError, StorageResult};
pub use file::{with_suffix, ArtifactPaths, FileBackend, INDEX_SUFFIX, TEMP_SUFFIX};
pub use memory::InMemoryBackend;
