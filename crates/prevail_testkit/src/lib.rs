//! # Prevail Testkit
//!
//! Test utilities for Prevail.
//!
//! This crate provides:
//! - Sample entity types and a matching configuration
//! - Test fixtures that can close, crash and reopen a database
//! - A fault-injecting artifact backend
//! - Property-based test generators and a reference model
//! - Concurrent stress helpers
//!
//! ## Usage
//!
//! ```rust,ignore
//! use prevail_testkit::prelude::*;
//!
//! #[test]
//! fn test_with_database() {
//!     with_temp_db(|db| {
//!         db.set("bob", Human::new("Bob", "Smith", 42, "Lyon")).unwrap();
//!     });
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod crash;
pub mod entities;
pub mod fixtures;
pub mod generators;
pub mod stress;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::crash::*;
    pub use crate::entities::*;
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::stress::*;
}

pub use crash::*;
pub use entities::*;
pub use fixtures::*;
pub use generators::*;
pub use stress::*;
