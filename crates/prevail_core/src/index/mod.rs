//! Secondary indexes.
//!
//! Every index is an equality index over one field of one record type,
//! keyed by `(TypeIdentity, field)`. Indexes are maintained incrementally
//! on each committed write and are fully derivable from the record store,
//! so a lost or corrupt index artifact is rebuilt rather than reported.

mod hash;
mod manager;

pub use hash::HashIndex;
pub use manager::{IndexEntry, IndexManager, IndexReport};
