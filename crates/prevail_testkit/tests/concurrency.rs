//! Concurrent commits and readers.

use prevail_core::{Database, Entity};
use prevail_testkit::{sample_config, stress_paired_writes, Human, StressConfig, TestDatabase};
use std::sync::Arc;
use std::thread;

#[test]
fn disjoint_commits_all_land() {
    let db = Arc::new(TestDatabase::file());
    db.create_index_on::<Human>("City");

    let handles: Vec<_> = (0..6)
        .map(|t| {
            let db = Arc::clone(&db);
            thread::spawn(move || {
                for i in 0..15u32 {
                    let city = if i % 2 == 0 { "Paris" } else { "Lyon" };
                    db.set(format!("t{t}-{i}"), Human::new("N", "T", i, city))
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(db.len(), 90);
    assert_eq!(db.keys_by_index(&Human::identity(), "City", "Paris").len(), 48);
    assert_eq!(db.keys_by_index(&Human::identity(), "City", "Lyon").len(), 42);
    assert!(db.verify_indexes().is_consistent());
    assert!(!db.is_dirty());
}

#[test]
fn readers_never_see_half_a_transaction() {
    let test_db = TestDatabase::memory();
    let result = stress_paired_writes(&test_db, &StressConfig::default());

    assert_eq!(result.failed_ops, 0);
    assert_eq!(result.torn_reads, 0);
    assert_eq!(test_db.len(), 2 * 4 * 25);
}

#[test]
fn last_committed_write_wins_on_shared_key() {
    let db = Arc::new(Database::open_with_backend(sample_config(), prevail_storage::InMemoryBackend::new()).unwrap());
    db.create_index_on::<Human>("Age");

    thread::scope(|scope| {
        for t in 0..4u32 {
            let db = &db;
            scope.spawn(move || {
                for _ in 0..20 {
                    db.set("shared", Human::new("N", "T", t, "Paris")).unwrap();
                }
            });
        }
    });

    let age = db.get_as::<Human>("shared").unwrap().age;
    assert_eq!(db.keys_by_index(&Human::identity(), "Age", age), ["shared"]);
    let report = db.verify_indexes();
    assert!(report.is_consistent(), "{report:?}");
}
