//! Stress helpers for Prevail.
//!
//! These run writers and readers against one database from many threads
//! and report what they saw, so tests can assert on throughput-free
//! properties: every write landed, and no reader saw half a transaction.

use crate::entities::Human;
use prevail_core::Database;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread::{self, ScopedJoinHandle};
use std::time::{Duration, Instant};

/// Result of a stress test run.
#[derive(Debug, Clone)]
pub struct StressTestResult {
    /// Total operations performed.
    pub total_ops: usize,
    /// Successful operations.
    pub successful_ops: usize,
    /// Failed operations.
    pub failed_ops: usize,
    /// Reads that observed a partially applied transaction.
    pub torn_reads: usize,
    /// Total duration.
    pub duration: Duration,
}

impl StressTestResult {
    /// Creates a new result.
    pub fn new(successful: usize, failed: usize, torn_reads: usize, duration: Duration) -> Self {
        Self {
            total_ops: successful + failed,
            successful_ops: successful,
            failed_ops: failed,
            torn_reads,
            duration,
        }
    }

    /// Operations per second.
    pub fn ops_per_second(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs > 0.0 {
            self.total_ops as f64 / secs
        } else {
            0.0
        }
    }
}

/// Configuration for stress tests.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Number of writer threads.
    pub writers: usize,
    /// Transactions per writer.
    pub transactions_per_writer: usize,
    /// Number of reader threads.
    pub readers: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            writers: 4,
            transactions_per_writer: 25,
            readers: 2,
        }
    }
}

/// Key of the `slot` half of writer `writer`'s `n`th pair.
pub fn pair_key(writer: usize, n: usize, slot: char) -> String {
    format!("w{writer}-{n}-{slot}")
}

/// Runs concurrent writers on disjoint keys while readers watch.
///
/// Each writer commits pairs `(a, b)` in one transaction. Readers check
/// that whenever one half of a pair is visible, so is the other.
pub fn stress_paired_writes(db: &Database, config: &StressConfig) -> StressTestResult {
    let successful = AtomicUsize::new(0);
    let failed = AtomicUsize::new(0);
    let torn = AtomicUsize::new(0);
    let done = AtomicBool::new(false);
    let start = Instant::now();

    thread::scope(|scope| {
        for _ in 0..config.readers {
            scope.spawn(|| {
                while !done.load(Ordering::Acquire) {
                    let visible: HashSet<String> = db.keys().into_iter().collect();
                    for writer in 0..config.writers {
                        for n in 0..config.transactions_per_writer {
                            let a = visible.contains(&pair_key(writer, n, 'a'));
                            let b = visible.contains(&pair_key(writer, n, 'b'));
                            if a != b {
                                torn.fetch_add(1, Ordering::Relaxed);
                            }
                        }
                    }
                }
            });
        }

        let writers: Vec<_> = (0..config.writers)
            .map(|writer| {
                let successful = &successful;
                let failed = &failed;
                scope.spawn(move || {
                    for n in 0..config.transactions_per_writer {
                        let age = u32::try_from(n % 90).unwrap_or(0);
                        let result = db.transaction(|txn| {
                            txn.set(pair_key(writer, n, 'a'), Human::new("A", "Pair", age, "Paris"))
                                .set(pair_key(writer, n, 'b'), Human::new("B", "Pair", age, "Lyon"));
                            Ok(())
                        });
                        match result {
                            Ok(()) => successful.fetch_add(1, Ordering::Relaxed),
                            Err(_) => failed.fetch_add(1, Ordering::Relaxed),
                        };
                    }
                })
            })
            .collect();

        finish_writers(writers, &done);
    });

    StressTestResult::new(
        successful.into_inner(),
        failed.into_inner(),
        torn.into_inner(),
        start.elapsed(),
    )
}

/// Joins every writer, releases the readers, then re-raises the first
/// writer panic. Readers spin until `done`, so it is set before panicking.
fn finish_writers<T>(writers: Vec<ScopedJoinHandle<'_, T>>, done: &AtomicBool) {
    let outcomes: Vec<_> = writers.into_iter().map(|handle| handle.join()).collect();
    done.store(true, Ordering::Release);
    for outcome in outcomes {
        outcome.expect("writer panicked");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::TestDatabase;

    #[test]
    fn paired_writes_are_never_torn() {
        let test_db = TestDatabase::memory();
        let config = StressConfig {
            writers: 3,
            transactions_per_writer: 10,
            readers: 2,
        };

        let result = stress_paired_writes(&test_db, &config);
        assert_eq!(result.successful_ops, 30);
        assert_eq!(result.failed_ops, 0);
        assert_eq!(result.torn_reads, 0);
        assert_eq!(test_db.len(), 60);
    }

    #[test]
    #[should_panic(expected = "writer panicked")]
    fn writer_panic_is_propagated() {
        let done = AtomicBool::new(false);
        thread::scope(|scope| {
            let readers_done = &done;
            scope.spawn(move || while !readers_done.load(Ordering::Acquire) {});
            let writer = scope.spawn(|| panic!("disk on fire"));
            finish_writers(vec![writer], &done);
        });
    }
}
