//! Test fixtures and database helpers.
//!
//! Provides convenience functions for setting up test databases
//! and common test scenarios.

use crate::entities::sample_config;
use prevail_core::{Config, Database};
use prevail_storage::InMemoryBackend;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// File name of the data artifact inside a [`TestDatabase`] directory.
pub const DATA_FILE: &str = "test.prevail";

enum Location {
    Memory(InMemoryBackend),
    File(TempDir),
}

/// A test database that can be closed and reopened from the same storage.
pub struct TestDatabase {
    db: Option<Database>,
    config: Config,
    location: Location,
}

impl TestDatabase {
    /// Creates a database backed by shared in-memory slots.
    pub fn memory() -> Self {
        Self::memory_with_config(sample_config())
    }

    /// Creates an in-memory database with a custom configuration.
    pub fn memory_with_config(config: Config) -> Self {
        let disk = InMemoryBackend::new();
        let db = Database::open_with_backend(config.clone(), disk.clone())
            .expect("Failed to open in-memory database");
        Self {
            db: Some(db),
            config,
            location: Location::Memory(disk),
        }
    }

    /// Creates a database in a fresh temporary directory.
    pub fn file() -> Self {
        Self::file_with_config(sample_config())
    }

    /// Creates a file database with a custom configuration.
    pub fn file_with_config(config: Config) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let db = Database::open_with_config(temp_dir.path().join(DATA_FILE), config.clone())
            .expect("Failed to open file database");
        Self {
            db: Some(db),
            config,
            location: Location::File(temp_dir),
        }
    }

    /// Returns the open database.
    pub fn db(&self) -> &Database {
        self.db.as_ref().expect("database is closed")
    }

    /// Closes the database and opens it again from the same storage.
    pub fn reopen(&mut self) {
        if let Some(db) = self.db.take() {
            db.close().expect("Failed to close database");
        }
        self.db = Some(self.open_again().expect("Failed to reopen database"));
    }

    /// Drops the database without a final save, as a crash would.
    pub fn crash(&mut self) {
        self.db = None;
    }

    /// Opens the storage again, returning the error instead of panicking.
    pub fn try_reopen(&mut self) -> prevail_core::CoreResult<()> {
        self.db = None;
        self.db = Some(self.open_again()?);
        Ok(())
    }

    fn open_again(&self) -> prevail_core::CoreResult<Database> {
        match &self.location {
            Location::Memory(disk) => Database::open_with_backend(self.config.clone(), disk.clone()),
            Location::File(dir) => {
                Database::open_with_config(dir.path().join(DATA_FILE), self.config.clone())
            }
        }
    }

    /// Returns the data artifact path if file-based, None if in-memory.
    pub fn path(&self) -> Option<PathBuf> {
        match &self.location {
            Location::Memory(_) => None,
            Location::File(dir) => Some(dir.path().join(DATA_FILE)),
        }
    }

    /// Returns the shared slots if in-memory, None if file-based.
    pub fn disk(&self) -> Option<&InMemoryBackend> {
        match &self.location {
            Location::Memory(disk) => Some(disk),
            Location::File(_) => None,
        }
    }
}

impl std::ops::Deref for TestDatabase {
    type Target = Database;

    fn deref(&self) -> &Self::Target {
        self.db()
    }
}

/// Runs a test with a temporary in-memory database.
///
/// # Example
///
/// ```rust,ignore
/// use prevail_testkit::with_temp_db;
///
/// #[test]
/// fn my_test() {
///     with_temp_db(|db| {
///         db.set("bob", Human::new("Bob", "Smith", 42, "Lyon")).unwrap();
///     });
/// }
/// ```
pub fn with_temp_db<F, R>(f: F) -> R
where
    F: FnOnce(&Database) -> R,
{
    let test_db = TestDatabase::memory();
    f(test_db.db())
}

/// Runs a test with a temporary file-based database.
pub fn with_file_db<F, R>(f: F) -> R
where
    F: FnOnce(&Database, &Path) -> R,
{
    let test_db = TestDatabase::file();
    let path = test_db.path().expect("File database should have a path");
    f(test_db.db(), &path)
}

/// Test scenario helpers.
pub mod scenarios {
    use super::*;
    use crate::entities::Human;

    /// Cities used by [`populated_database`], in round-robin order.
    pub const CITIES: [&str; 4] = ["Paris", "Lyon", "Nice", "Lille"];

    /// Creates a database holding `count` humans keyed `h0`, `h1`, ...
    /// with an index on `City`.
    pub fn populated_database(count: usize) -> TestDatabase {
        let test_db = TestDatabase::memory();
        test_db.create_index_on::<Human>("City");
        test_db
            .transaction(|txn| {
                for i in 0..count {
                    let age = u32::try_from(i % 90).unwrap_or(0);
                    txn.set(
                        format!("h{i}"),
                        Human::new(&format!("First{i}"), "Doe", age, CITIES[i % CITIES.len()]),
                    );
                }
                Ok(())
            })
            .expect("Failed to populate database");
        test_db
    }
}
