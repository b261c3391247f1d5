//! Benchmark utilities.

use prevail_core::{Config, Database, Entity};
use prevail_storage::InMemoryBackend;
use prevail_testkit::{sample_config, Human};
use rand::seq::SliceRandom;
use rand::Rng;

/// Cities used for generated humans. Index buckets grow with the record
/// count divided by this length.
pub const CITIES: [&str; 8] = [
    "Paris", "Lyon", "Nice", "Lille", "Nantes", "Rennes", "Brest", "Metz",
];

/// Generate random bytes of the specified size.
pub fn random_data(size: usize) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    (0..size).map(|_| rng.gen()).collect()
}

/// Generate a human living in a random city.
pub fn random_human() -> Human {
    let mut rng = rand::thread_rng();
    let city = CITIES.choose(&mut rng).copied().unwrap_or("Paris");
    Human::new("Bench", "Mark", rng.gen_range(0..100), city)
}

/// Generate `count` keyed humans.
pub fn generate_humans(count: usize) -> Vec<(String, Human)> {
    (0..count)
        .map(|i| (format!("human-{i:06}"), random_human()))
        .collect()
}

/// Configuration for benchmark databases: no fsync, no lock file.
pub fn bench_config() -> Config {
    sample_config().lock_file(false)
}

/// Open an in-memory database holding `count` humans, optionally indexed
/// on `City`.
pub fn populated_database(count: usize, indexed: bool) -> Database {
    populated_on(InMemoryBackend::new(), count, indexed)
}

/// Like [`populated_database`], over a caller-supplied backend so the
/// artifacts can be read back afterwards.
pub fn populated_on(disk: InMemoryBackend, count: usize, indexed: bool) -> Database {
    let db = Database::open_with_backend(bench_config(), disk).expect("open in-memory database");
    if indexed {
        db.create_index(Human::identity(), "City");
    }
    db.transaction(|txn| {
        for (key, human) in generate_humans(count) {
            txn.set(key, human);
        }
        Ok(())
    })
    .expect("populate database");
    db
}
