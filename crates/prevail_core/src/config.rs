//! Database configuration.

use crate::record::Entity;
use crate::registry::Registry;
use crate::types::{IndexDefinition, TypeIdentity};

/// Configuration for opening a database.
#[derive(Debug, Clone)]
pub struct Config {
    /// Whether to create the parent directory if it doesn't exist.
    pub create_if_missing: bool,

    /// Whether to fsync staged artifacts and renames on every save.
    pub sync_on_save: bool,

    /// Whether to hold an exclusive lock file while the database is open.
    pub lock_file: bool,

    /// Record types that snapshots may contain.
    pub registry: Registry,

    /// Indexes created automatically when the database opens.
    pub indexes: Vec<IndexDefinition>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            create_if_missing: true,
            sync_on_save: true,
            lock_file: true,
            registry: Registry::new(),
            indexes: Vec::new(),
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether to create the parent directory if missing.
    #[must_use]
    pub const fn create_if_missing(mut self, value: bool) -> Self {
        self.create_if_missing = value;
        self
    }

    /// Sets whether to fsync on every save.
    #[must_use]
    pub const fn sync_on_save(mut self, value: bool) -> Self {
        self.sync_on_save = value;
        self
    }

    /// Sets whether to take the lock file.
    #[must_use]
    pub const fn lock_file(mut self, value: bool) -> Self {
        self.lock_file = value;
        self
    }

    /// Registers a record type so snapshots containing it can be loaded.
    #[must_use]
    pub fn register<T: Entity>(mut self) -> Self {
        self.registry.register::<T>();
        self
    }

    /// Declares an index to create when the database opens.
    #[must_use]
    pub fn index(mut self, identity: TypeIdentity, field: impl Into<String>) -> Self {
        let definition = IndexDefinition::new(identity, field);
        if !self.indexes.contains(&definition) {
            self.indexes.push(definition);
        }
        self
    }

    /// Registers `T` and declares an index on one of its fields.
    #[must_use]
    pub fn index_on<T: Entity>(self, field: impl Into<String>) -> Self {
        self.register::<T>().index(T::identity(), field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert!(config.create_if_missing);
        assert!(config.sync_on_save);
        assert!(config.lock_file);
        assert!(config.registry.is_empty());
        assert!(config.indexes.is_empty());
    }

    #[test]
    fn builder_pattern() {
        let config = Config::new()
            .create_if_missing(false)
            .sync_on_save(false)
            .lock_file(false);

        assert!(!config.create_if_missing);
        assert!(!config.sync_on_save);
        assert!(!config.lock_file);
    }

    #[test]
    fn declared_indexes_are_deduplicated() {
        let human = TypeIdentity::new("people", "Human");
        let config = Config::new()
            .index(human.clone(), "city")
            .index(human.clone(), "city")
            .index(human, "age");

        assert_eq!(config.indexes.len(), 2);
    }
}
