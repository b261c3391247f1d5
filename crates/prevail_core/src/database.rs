//! Database facade, commit protocol and recovery.

use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use crate::index::{IndexManager, IndexReport};
use crate::lock::StoreLock;
use crate::record::{Entity, Record};
use crate::snapshot::{self, IndexLoad};
use crate::store::RecordStore;
use crate::transaction::{Operation, Transaction};
use crate::types::{IndexDefinition, TypeIdentity};
use parking_lot::{Mutex, RwLock, RwLockWriteGuard};
use prevail_codec::FieldValue;
use prevail_storage::{Artifact, ArtifactStore, FileBackend, InMemoryBackend};
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Everything guarded by the store lock.
#[derive(Debug, Default)]
struct State {
    store: RecordStore,
    indexes: IndexManager,
}

impl State {
    fn apply(&mut self, operation: Operation) {
        match operation {
            Operation::Set { key, record } => {
                if let Some(old) = self.store.get(&key) {
                    self.indexes.remove_record(&key, old.as_ref());
                }
                self.indexes.insert_record(&key, record.as_ref());
                self.store.put(key, record);
            }
            Operation::Delete { key } => {
                if let Some(old) = self.store.remove(&key) {
                    self.indexes.remove_record(&key, old.as_ref());
                }
            }
        }
    }
}

/// The main database handle.
///
/// `Database` keeps every record in memory and writes a full snapshot of
/// records and indexes after each commit. It provides:
/// - Keyed get/set/delete
/// - Multi-operation transactions
/// - Secondary equality indexes per `(TypeIdentity, field)`
/// - Predicate and index queries
///
/// # Locking
///
/// Records and indexes sit behind one reader/writer lock. Reads take it
/// shared. A commit first takes the commit lock, which serializes whole
/// "apply then save" sequences, then takes the store lock exclusively to
/// apply its operations in order. It downgrades to shared mode for the
/// save, so readers see either none or all of a commit's operations.
///
/// # Failure window
///
/// Operations are applied in memory before the snapshot is written, and
/// are not rolled back if the save fails. The commit returns the error,
/// memory stays ahead of disk, and [`is_dirty`](Self::is_dirty) reports
/// true until a later commit, [`save`](Self::save) or
/// [`close`](Self::close) writes a snapshot successfully.
///
/// # Example
///
/// ```rust,ignore
/// use prevail_core::{Config, Database};
///
/// let db = Database::open_with_config("people.db", Config::new().index_on::<Human>("city"))?;
/// db.set("alice", Human::new("Alice", "Paris"))?;
///
/// let parisians: Vec<Human> = db.find_by_index("city", "Paris");
/// db.close()?;
/// ```
pub struct Database {
    /// Configuration.
    config: Config,
    /// Records and indexes.
    state: RwLock<State>,
    /// Artifact backend. Its mutex is the commit lock.
    backend: Mutex<Box<dyn ArtifactStore>>,
    /// Set while in-memory state is ahead of the last snapshot.
    dirty: AtomicBool,
    /// Lock file handle, held for the lifetime of the database.
    _lock: Option<StoreLock>,
}

impl Database {
    /// Opens a database whose data artifact lives at `path`.
    ///
    /// The index artifact is stored beside it at `<path>.index`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Another handle has the path locked (`DatabaseLocked`)
    /// - The data artifact cannot be decoded or names an unregistered type
    /// - I/O errors occur
    pub fn open(path: impl AsRef<Path>) -> CoreResult<Self> {
        Self::open_with_config(path, Config::default())
    }

    /// Opens a database with custom configuration.
    ///
    /// # Errors
    ///
    /// See [`open`](Self::open).
    pub fn open_with_config(path: impl AsRef<Path>, config: Config) -> CoreResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.exists() {
                if config.create_if_missing {
                    fs::create_dir_all(parent)?;
                } else {
                    return Err(CoreError::Io(io::Error::new(
                        io::ErrorKind::NotFound,
                        format!("database directory does not exist: {}", parent.display()),
                    )));
                }
            }
        }

        let lock = if config.lock_file {
            Some(StoreLock::acquire(path)?)
        } else {
            None
        };
        let backend = FileBackend::new(path).with_sync(config.sync_on_save);
        info!(path = %path.display(), "opening database");
        Self::load(config, Box::new(backend), lock)
    }

    /// Opens an in-memory database.
    ///
    /// Snapshots are kept in memory and vanish with the handle.
    ///
    /// # Errors
    ///
    /// Returns an error only if a declared index cannot be set up.
    pub fn open_in_memory() -> CoreResult<Self> {
        Self::open_with_backend(Config::default(), InMemoryBackend::new())
    }

    /// Opens a database on a caller-supplied artifact backend.
    ///
    /// No lock file is taken; the backend owns exclusivity.
    ///
    /// # Errors
    ///
    /// See [`open`](Self::open).
    pub fn open_with_backend<S>(config: Config, backend: S) -> CoreResult<Self>
    where
        S: ArtifactStore + 'static,
    {
        Self::load(config, Box::new(backend), None)
    }

    fn load(
        config: Config,
        mut backend: Box<dyn ArtifactStore>,
        lock: Option<StoreLock>,
    ) -> CoreResult<Self> {
        let mut rebuilt = false;
        let (store, mut indexes) = match snapshot::load_data(&*backend, &config.registry)? {
            None => (RecordStore::new(), IndexManager::new()),
            Some(store) => match snapshot::load_indexes(&*backend)? {
                IndexLoad::Loaded(indexes) => (store, indexes),
                IndexLoad::Missing => {
                    warn!("index artifact missing, rebuilding indexes");
                    rebuilt = true;
                    (store, IndexManager::new())
                }
                IndexLoad::Corrupt(err) => {
                    warn!(error = %err, "index artifact corrupt, rebuilding indexes");
                    backend.remove(Artifact::Index)?;
                    rebuilt = true;
                    (store, IndexManager::new())
                }
            },
        };

        let mut created = 0;
        for definition in &config.indexes {
            if indexes.create(definition, &store) {
                created += 1;
            }
        }

        info!(
            records = store.len(),
            indexes = indexes.len(),
            rebuilt,
            "database loaded"
        );

        let db = Self {
            config,
            state: RwLock::new(State { store, indexes }),
            backend: Mutex::new(backend),
            dirty: AtomicBool::new(false),
            _lock: lock,
        };

        if rebuilt {
            db.save()?;
        } else if created > 0 {
            db.dirty.store(true, Ordering::Release);
        }
        Ok(db)
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Returns the record stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Arc<dyn Record>> {
        self.state.read().store.get(key).cloned()
    }

    /// Returns a copy of the record under `key` if it is a `T`.
    #[must_use]
    pub fn get_as<T: Entity + Clone>(&self, key: &str) -> Option<T> {
        let state = self.state.read();
        state.store.get(key)?.downcast_ref::<T>().cloned()
    }

    /// Returns true if `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.state.read().store.contains_key(key)
    }

    /// Returns the number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.read().store.len()
    }

    /// Returns true if no records are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.read().store.is_empty()
    }

    /// Returns every key, sorted.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let state = self.state.read();
        let mut keys: Vec<_> = state.store.iter().map(|(key, _)| key.to_owned()).collect();
        keys.sort_unstable();
        keys
    }

    // ========================================================================
    // Writes
    // ========================================================================

    /// Stores `value` under `key`, replacing any previous record.
    ///
    /// Shorthand for a single-operation transaction.
    ///
    /// # Errors
    ///
    /// Returns the snapshot error if saving fails. The write stays applied
    /// in memory.
    pub fn set<T: Entity>(&self, key: impl Into<String>, value: T) -> CoreResult<()> {
        self.transaction(|txn| {
            txn.set(key, value);
            Ok(())
        })
    }

    /// Removes the record under `key`. Deleting a missing key still
    /// commits.
    ///
    /// # Errors
    ///
    /// See [`set`](Self::set).
    pub fn delete(&self, key: impl Into<String>) -> CoreResult<()> {
        self.transaction(|txn| {
            txn.delete(key);
            Ok(())
        })
    }

    /// Begins a new transaction.
    #[must_use]
    pub fn begin(&self) -> Transaction {
        Transaction::new()
    }

    /// Commits a transaction.
    ///
    /// Applies every operation in enqueue order, then writes a snapshot.
    /// An empty transaction commits without writing anything.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOperation` if the transaction was already
    /// committed, or the snapshot error if saving fails. A save failure
    /// does not undo the applied operations.
    pub fn commit(&self, txn: &mut Transaction) -> CoreResult<()> {
        txn.ensure_active()?;
        let operations = txn.take_operations();
        if operations.is_empty() {
            return Ok(());
        }

        let mut backend = self.backend.lock();
        let mut state = self.state.write();
        let count = operations.len();
        for operation in operations {
            state.apply(operation);
        }
        let state = RwLockWriteGuard::downgrade(state);
        debug!(operations = count, "transaction applied");

        self.persist(&mut **backend, &state)
    }

    /// Executes a function within a transaction.
    ///
    /// If the function returns `Ok`, the transaction is committed.
    /// If it returns `Err`, nothing is applied.
    ///
    /// # Errors
    ///
    /// Returns the closure's error or the commit error.
    pub fn transaction<F, R>(&self, f: F) -> CoreResult<R>
    where
        F: FnOnce(&mut Transaction) -> CoreResult<R>,
    {
        let mut txn = self.begin();
        let result = f(&mut txn)?;
        self.commit(&mut txn)?;
        Ok(result)
    }

    // ========================================================================
    // Indexes
    // ========================================================================

    /// Creates an index on `field` of records with `identity`, populated
    /// from the records already stored.
    ///
    /// Returns false if the index already existed. The new index is
    /// written with the next snapshot.
    pub fn create_index(&self, identity: TypeIdentity, field: impl Into<String>) -> bool {
        let definition = IndexDefinition::new(identity, field);
        let mut state = self.state.write();
        let State { store, indexes } = &mut *state;
        let created = indexes.create(&definition, store);
        if created {
            self.dirty.store(true, Ordering::Release);
            debug!(index = %definition, "index created");
        }
        created
    }

    /// Creates an index on `field` of entity type `T`.
    pub fn create_index_on<T: Entity>(&self, field: impl Into<String>) -> bool {
        self.create_index(T::identity(), field)
    }

    /// Returns every index definition, sorted.
    #[must_use]
    pub fn index_definitions(&self) -> Vec<IndexDefinition> {
        self.state.read().indexes.definitions()
    }

    /// Recomputes every index from the stored records and saves.
    ///
    /// # Errors
    ///
    /// Returns the snapshot error if saving fails.
    pub fn rebuild_indexes(&self) -> CoreResult<()> {
        let mut backend = self.backend.lock();
        let mut state = self.state.write();
        let State { store, indexes } = &mut *state;
        indexes.rebuild(store);
        info!(indexes = indexes.len(), "indexes rebuilt");
        let state = RwLockWriteGuard::downgrade(state);
        self.persist(&mut **backend, &state)
    }

    /// Checks every index against the stored records without changing
    /// anything.
    #[must_use]
    pub fn verify_indexes(&self) -> IndexReport {
        let state = self.state.read();
        state.indexes.verify(&state.store)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Returns every record matching `predicate`, in unspecified order.
    ///
    /// See [`crate::query`] for predicate constructors.
    pub fn query<P>(&self, predicate: P) -> Vec<Arc<dyn Record>>
    where
        P: Fn(&dyn Record) -> bool,
    {
        let state = self.state.read();
        state
            .store
            .iter()
            .filter(|(_, record)| predicate(&***record))
            .map(|(_, record)| Arc::clone(record))
            .collect()
    }

    /// Returns copies of every `T` matching `predicate`.
    pub fn query_as<T, P>(&self, predicate: P) -> Vec<T>
    where
        T: Entity + Clone,
        P: Fn(&T) -> bool,
    {
        let state = self.state.read();
        state
            .store
            .iter()
            .filter_map(|(_, record)| record.downcast_ref::<T>())
            .filter(|value| predicate(value))
            .cloned()
            .collect()
    }

    /// Returns copies of every stored `T`.
    #[must_use]
    pub fn all_of<T: Entity + Clone>(&self) -> Vec<T> {
        self.query_as(|_: &T| true)
    }

    /// Returns the keys an index holds under `value`.
    ///
    /// A missing index or bucket yields an empty result.
    #[must_use]
    pub fn keys_by_index(
        &self,
        identity: &TypeIdentity,
        field: &str,
        value: impl Into<FieldValue>,
    ) -> Vec<String> {
        self.state
            .read()
            .indexes
            .lookup(identity, field, &value.into())
    }

    /// Returns the records an index holds under `value`.
    ///
    /// Keys the index holds that are no longer stored are skipped.
    #[must_use]
    pub fn query_by_index(
        &self,
        identity: &TypeIdentity,
        field: &str,
        value: impl Into<FieldValue>,
    ) -> Vec<Arc<dyn Record>> {
        let state = self.state.read();
        state
            .indexes
            .lookup(identity, field, &value.into())
            .iter()
            .filter_map(|key| state.store.get(key).cloned())
            .collect()
    }

    /// Returns copies of the `T` records an index holds under `value`.
    #[must_use]
    pub fn find_by_index<T: Entity + Clone>(
        &self,
        field: &str,
        value: impl Into<FieldValue>,
    ) -> Vec<T> {
        self.query_by_index(&T::identity(), field, value)
            .iter()
            .filter_map(|record| record.downcast_ref::<T>().cloned())
            .collect()
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Writes a snapshot of the current state.
    ///
    /// # Errors
    ///
    /// Returns the snapshot error if saving fails.
    pub fn save(&self) -> CoreResult<()> {
        let mut backend = self.backend.lock();
        let state = self.state.read();
        self.persist(&mut **backend, &state)
    }

    /// Returns true if in-memory state is ahead of the last snapshot.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    /// Closes the database, saving first if it is dirty, and releases
    /// the lock file.
    ///
    /// # Errors
    ///
    /// Returns the snapshot error if the final save fails.
    pub fn close(self) -> CoreResult<()> {
        if self.is_dirty() {
            self.save()?;
        }
        info!("database closed");
        Ok(())
    }

    /// Returns database configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    fn persist(&self, backend: &mut dyn ArtifactStore, state: &State) -> CoreResult<()> {
        match snapshot::save(backend, &state.store, &state.indexes) {
            Ok(()) => {
                self.dirty.store(false, Ordering::Release);
                Ok(())
            }
            Err(err) => {
                self.dirty.store(true, Ordering::Release);
                warn!(error = %err, "snapshot save failed, in-memory state is ahead of disk");
                Err(err)
            }
        }
    }
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("Database")
            .field("records", &state.store.len())
            .field("indexes", &state.indexes.definitions())
            .field("dirty", &self.is_dirty())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::field_equals;
    use crate::record::Field;
    use serde::{Deserialize, Serialize};
    use std::thread;
    use tempfile::tempdir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Human {
        name: String,
        city: String,
        age: u32,
    }

    impl Human {
        fn new(name: &str, city: &str, age: u32) -> Self {
            Self {
                name: name.into(),
                city: city.into(),
                age,
            }
        }
    }

    impl Entity for Human {
        const NAMESPACE: &'static str = "people";
        const NAME: &'static str = "Human";
        const FIELDS: &'static [Field<Self>] = &[
            Field::new("name", |h: &Human| FieldValue::from(&h.name)),
            Field::new("city", |h: &Human| FieldValue::from(&h.city)),
            Field::new("age", |h: &Human| FieldValue::from(h.age)),
        ];
    }

    fn config() -> Config {
        Config::new().register::<Human>().sync_on_save(false)
    }

    fn city_keys(db: &Database, city: &str) -> Vec<String> {
        db.keys_by_index(&Human::identity(), "city", city)
    }

    #[test]
    fn set_get_delete() {
        let db = Database::open_in_memory().unwrap();
        let bob = Human::new("Bob", "Lyon", 42);

        db.set("bob", bob.clone()).unwrap();
        assert_eq!(db.get_as::<Human>("bob"), Some(bob));
        assert!(db.get("bob").unwrap().is::<Human>());

        db.delete("bob").unwrap();
        assert!(db.get("bob").is_none());
        assert!(db.is_empty());
    }

    #[test]
    fn transaction_applies_in_order() {
        let db = Database::open_in_memory().unwrap();
        let mut txn = db.begin();
        txn.set("1", Human::new("Alice", "Paris", 30))
            .set("2", Human::new("Bob", "Lyon", 42))
            .delete("1")
            .set("1", Human::new("Alice", "Nice", 31));
        assert!(db.is_empty());

        db.commit(&mut txn).unwrap();
        assert_eq!(db.keys(), ["1", "2"]);
        assert_eq!(db.get_as::<Human>("1").unwrap().city, "Nice");
    }

    #[test]
    fn double_commit_is_rejected() {
        let db = Database::open_in_memory().unwrap();
        let mut txn = db.begin();
        txn.set("1", Human::new("Alice", "Paris", 30));
        db.commit(&mut txn).unwrap();

        let err = db.commit(&mut txn).unwrap_err();
        assert!(matches!(err, CoreError::InvalidOperation { .. }));
    }

    #[test]
    fn failed_closure_applies_nothing() {
        let db = Database::open_in_memory().unwrap();
        let result: CoreResult<()> = db.transaction(|txn| {
            txn.set("1", Human::new("Alice", "Paris", 30));
            Err(CoreError::invalid_operation("changed my mind"))
        });
        assert!(result.is_err());
        assert!(db.is_empty());
    }

    #[test]
    fn index_follows_updates_and_deletes() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.create_index_on::<Human>("city"));
        assert!(!db.create_index_on::<Human>("city"));

        db.set("alice", Human::new("Alice", "Paris", 30)).unwrap();
        db.set("bob", Human::new("Bob", "Lyon", 42)).unwrap();
        db.set("charlie", Human::new("Charlie", "Paris", 25)).unwrap();
        assert_eq!(city_keys(&db, "Paris"), ["alice", "charlie"]);

        db.set("alice", Human::new("Alice", "Lyon", 30)).unwrap();
        assert_eq!(city_keys(&db, "Paris"), ["charlie"]);
        assert_eq!(city_keys(&db, "Lyon"), ["alice", "bob"]);

        db.delete("charlie").unwrap();
        assert!(city_keys(&db, "Paris").is_empty());
        assert!(db.verify_indexes().is_consistent());
    }

    #[test]
    fn index_created_after_records_is_populated() {
        let db = Database::open_in_memory().unwrap();
        db.set("alice", Human::new("Alice", "Paris", 30)).unwrap();
        db.create_index(Human::identity(), "age");

        let found: Vec<Human> = db.find_by_index("age", 30u32);
        assert_eq!(found, vec![Human::new("Alice", "Paris", 30)]);
    }

    #[test]
    fn query_with_predicates() {
        let db = Database::open_in_memory().unwrap();
        db.set("alice", Human::new("Alice", "Paris", 30)).unwrap();
        db.set("bob", Human::new("Bob", "Lyon", 42)).unwrap();

        assert_eq!(db.query(field_equals("city", "Lyon")).len(), 1);
        assert_eq!(db.query(|_| true).len(), 2);

        let older: Vec<Human> = db.query_as(|h: &Human| h.age > 35);
        assert_eq!(older.len(), 1);
        assert_eq!(older[0].name, "Bob");
        assert_eq!(db.all_of::<Human>().len(), 2);
    }

    #[test]
    fn empty_commit_writes_nothing() {
        let disk = InMemoryBackend::new();
        let db = Database::open_with_backend(config(), disk.clone()).unwrap();

        db.commit(&mut db.begin()).unwrap();
        assert!(disk.live(Artifact::Data).is_none());

        db.set("a", Human::new("A", "X", 1)).unwrap();
        assert!(disk.live(Artifact::Data).is_some());
        assert!(disk.live(Artifact::Index).is_some());
    }

    #[test]
    fn reopen_restores_records_and_indexes() {
        let disk = InMemoryBackend::new();
        {
            let db = Database::open_with_backend(config(), disk.clone()).unwrap();
            db.create_index_on::<Human>("city");
            db.set("alice", Human::new("Alice", "Paris", 30)).unwrap();
            db.close().unwrap();
        }

        let db = Database::open_with_backend(config(), disk).unwrap();
        assert_eq!(db.len(), 1);
        assert_eq!(city_keys(&db, "Paris"), ["alice"]);
        assert!(!db.is_dirty());
    }

    #[test]
    fn missing_index_artifact_rebuilds_declared_indexes() {
        let disk = InMemoryBackend::new();
        let declared = config().index(Human::identity(), "city");
        {
            let db = Database::open_with_backend(declared.clone(), disk.clone()).unwrap();
            db.set("alice", Human::new("Alice", "Paris", 30)).unwrap();
        }
        disk.clone().remove(Artifact::Index).unwrap();

        let db = Database::open_with_backend(declared, disk.clone()).unwrap();
        assert_eq!(city_keys(&db, "Paris"), ["alice"]);
        assert!(disk.live(Artifact::Index).is_some());
    }

    #[test]
    fn corrupt_index_artifact_is_recovered() {
        let disk = InMemoryBackend::new();
        {
            let db = Database::open_with_backend(config(), disk.clone()).unwrap();
            db.create_index_on::<Human>("city");
            db.set("alice", Human::new("Alice", "Paris", 30)).unwrap();
        }
        disk.put_live(Artifact::Index, b"not an index".to_vec());

        let db = Database::open_with_backend(config(), disk).unwrap();
        assert_eq!(db.len(), 1);
        assert!(db.index_definitions().is_empty());

        db.create_index_on::<Human>("city");
        assert_eq!(city_keys(&db, "Paris"), ["alice"]);
    }

    #[test]
    fn corrupt_data_artifact_fails_open() {
        let disk = InMemoryBackend::new();
        disk.put_live(Artifact::Data, b"not data".to_vec());

        let err = Database::open_with_backend(config(), disk).unwrap_err();
        assert!(matches!(err, CoreError::Codec(_)));
    }

    #[test]
    fn file_database_reopens() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("people.db");
        {
            let db = Database::open_with_config(&path, config()).unwrap();
            db.set("bob", Human::new("Bob", "Lyon", 42)).unwrap();
            assert!(matches!(
                Database::open_with_config(&path, config()),
                Err(CoreError::DatabaseLocked)
            ));
            db.close().unwrap();
        }

        let db = Database::open_with_config(&path, config()).unwrap();
        assert_eq!(db.get_as::<Human>("bob").unwrap().age, 42);
    }

    #[test]
    fn missing_directory_without_create() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent").join("people.db");
        let err = Database::open_with_config(&path, config().create_if_missing(false)).unwrap_err();
        match err {
            CoreError::Io(io_err) => assert_eq!(io_err.kind(), io::ErrorKind::NotFound),
            other => panic!("expected a not-found I/O error, got {other:?}"),
        }
        assert!(!dir.path().join("absent").exists());
    }

    #[test]
    fn concurrent_disjoint_commits() {
        let db = Arc::new(Database::open_with_backend(config(), InMemoryBackend::new()).unwrap());
        db.create_index_on::<Human>("city");

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let db = Arc::clone(&db);
                thread::spawn(move || {
                    for i in 0..10 {
                        db.set(format!("{t}-{i}"), Human::new("N", "Paris", i)).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(db.len(), 80);
        assert_eq!(city_keys(&db, "Paris").len(), 80);
        assert!(db.verify_indexes().is_consistent());
    }
}
