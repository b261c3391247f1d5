//! # Prevail Core
//!
//! An embedded object prevalence layer: every record lives in memory and
//! durability comes from full snapshots written after each commit.
//!
//! This crate provides:
//! - A keyed record store over application-defined [`Entity`] types
//! - Secondary equality indexes keyed by `(TypeIdentity, field)`
//! - Multi-operation transactions with serialized commits
//! - Snapshot persistence with atomic replacement and index rebuild on load
//! - Predicate and index-assisted queries
//!
//! ## Example
//!
//! ```rust
//! use prevail_core::{query, Config, Database, Entity, Field, FieldValue};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
//! struct Human {
//!     name: String,
//!     city: String,
//! }
//!
//! impl Entity for Human {
//!     const NAMESPACE: &'static str = "people";
//!     const NAME: &'static str = "Human";
//!     const FIELDS: &'static [Field<Self>] = &[
//!         Field::new("name", |h: &Human| FieldValue::from(&h.name)),
//!         Field::new("city", |h: &Human| FieldValue::from(&h.city)),
//!     ];
//! }
//!
//! let db = Database::open_in_memory().unwrap();
//! db.create_index_on::<Human>("city");
//!
//! let mut txn = db.begin();
//! txn.set("alice", Human { name: "Alice".into(), city: "Paris".into() })
//!     .set("bob", Human { name: "Bob".into(), city: "Lyon".into() });
//! db.commit(&mut txn).unwrap();
//!
//! let parisians: Vec<Human> = db.find_by_index("city", "Paris");
//! assert_eq!(parisians.len(), 1);
//! assert_eq!(db.query(query::field_equals("name", "Bob")).len(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod database;
mod error;
mod index;
mod lock;
pub mod query;
mod record;
mod registry;
pub mod snapshot;
mod store;
mod transaction;
mod types;

pub use config::Config;
pub use database::Database;
pub use error::{CoreError, CoreResult};
pub use index::{HashIndex, IndexEntry, IndexManager, IndexReport};
pub use lock::{StoreLock, LOCK_SUFFIX};
pub use prevail_codec::FieldValue;
pub use record::{Entity, Field, Record};
pub use registry::Registry;
pub use store::RecordStore;
pub use transaction::{Operation, Transaction, TransactionState};
pub use types::{IndexDefinition, TypeIdentity};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
