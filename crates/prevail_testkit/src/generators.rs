//! Property-based test generators using proptest.
//!
//! Keys and field values are drawn from small pools so generated
//! sequences overwrite and delete the same keys often, which is where
//! index maintenance goes wrong.

use crate::entities::{Dog, Human};
use prevail_core::{Database, Transaction};
use proptest::prelude::*;
use std::collections::BTreeMap;

/// Cities generated humans live in.
pub const CITIES: [&str; 3] = ["Paris", "Lyon", "Nice"];

/// Strategy for keys from a pool of `pool` distinct keys.
pub fn key_strategy(pool: usize) -> impl Strategy<Value = String> {
    (0..pool.max(1)).prop_map(|i| format!("k{i}"))
}

/// Strategy for humans with a city from [`CITIES`].
pub fn human_strategy() -> impl Strategy<Value = Human> {
    (
        prop::string::string_regex("[A-Z][a-z]{0,7}").expect("Invalid regex"),
        0u32..100,
        prop::sample::select(CITIES.to_vec()),
    )
        .prop_map(|(name, age, city)| Human::new(&name, "Doe", age, city))
}

/// A generated store mutation.
#[derive(Debug, Clone)]
pub enum StoreOperation {
    /// Set a human.
    SetHuman {
        /// Key.
        key: String,
        /// Value.
        human: Human,
    },
    /// Set a dog, replacing whatever the key held.
    SetDog {
        /// Key.
        key: String,
        /// Value.
        dog: Dog,
    },
    /// Delete a key.
    Delete {
        /// Key.
        key: String,
    },
}

impl StoreOperation {
    /// Enqueues the operation.
    pub fn enqueue(&self, txn: &mut Transaction) {
        match self {
            StoreOperation::SetHuman { key, human } => {
                txn.set(key.clone(), human.clone());
            }
            StoreOperation::SetDog { key, dog } => {
                txn.set(key.clone(), dog.clone());
            }
            StoreOperation::Delete { key } => {
                txn.delete(key.clone());
            }
        }
    }

    /// Applies the operation directly to `db`.
    pub fn apply(&self, db: &Database) -> prevail_core::CoreResult<()> {
        let mut txn = db.begin();
        self.enqueue(&mut txn);
        db.commit(&mut txn)
    }
}

/// Strategy for store operations over a pool of `pool` keys.
pub fn store_operation_strategy(pool: usize) -> impl Strategy<Value = StoreOperation> {
    prop_oneof![
        4 => (key_strategy(pool), human_strategy())
            .prop_map(|(key, human)| StoreOperation::SetHuman { key, human }),
        1 => (key_strategy(pool), "[a-z]{1,6}")
            .prop_map(|(key, name)| StoreOperation::SetDog {
                key,
                dog: Dog { name, breed: "Mutt".into() },
            }),
        2 => key_strategy(pool).prop_map(|key| StoreOperation::Delete { key }),
    ]
}

/// Strategy for a sequence of operations.
pub fn operation_sequence_strategy(
    pool: usize,
    min_ops: usize,
    max_ops: usize,
) -> impl Strategy<Value = Vec<StoreOperation>> {
    prop::collection::vec(store_operation_strategy(pool), min_ops..max_ops)
}

/// Strategy for batches of operations, each batch one transaction.
pub fn transaction_batches_strategy(
    pool: usize,
    max_batches: usize,
) -> impl Strategy<Value = Vec<Vec<StoreOperation>>> {
    prop::collection::vec(operation_sequence_strategy(pool, 0, 6), 1..max_batches.max(2))
}

/// A value held by the [`Model`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelValue {
    /// A human.
    Human(Human),
    /// A dog.
    Dog(Dog),
}

/// A reference model of the store: a plain ordered map.
#[derive(Debug, Clone, Default)]
pub struct Model {
    entries: BTreeMap<String, ModelValue>,
}

impl Model {
    /// Creates an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one operation.
    pub fn apply(&mut self, operation: &StoreOperation) {
        match operation {
            StoreOperation::SetHuman { key, human } => {
                self.entries
                    .insert(key.clone(), ModelValue::Human(human.clone()));
            }
            StoreOperation::SetDog { key, dog } => {
                self.entries.insert(key.clone(), ModelValue::Dog(dog.clone()));
            }
            StoreOperation::Delete { key } => {
                self.entries.remove(key);
            }
        }
    }

    /// Returns the value under `key`.
    pub fn get(&self, key: &str) -> Option<&ModelValue> {
        self.entries.get(key)
    }

    /// Returns every key, sorted.
    pub fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Returns the sorted keys of humans living in `city`.
    pub fn humans_in(&self, city: &str) -> Vec<String> {
        self.entries
            .iter()
            .filter_map(|(key, value)| match value {
                ModelValue::Human(human) if human.city == city => Some(key.clone()),
                _ => None,
            })
            .collect()
    }
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 64,
            max_shrink_iters: 1_000,
        }
    }
}

impl PropTestConfig {
    /// Converts to a proptest configuration.
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_tracks_cities() {
        let mut model = Model::new();
        model.apply(&StoreOperation::SetHuman {
            key: "a".into(),
            human: Human::new("A", "Doe", 1, "Paris"),
        });
        model.apply(&StoreOperation::SetDog {
            key: "b".into(),
            dog: Dog {
                name: "Rex".into(),
                breed: "Mutt".into(),
            },
        });
        assert_eq!(model.humans_in("Paris"), ["a"]);

        model.apply(&StoreOperation::SetDog {
            key: "a".into(),
            dog: Dog {
                name: "Fido".into(),
                breed: "Mutt".into(),
            },
        });
        assert!(model.humans_in("Paris").is_empty());
        assert_eq!(model.keys(), ["a", "b"]);
    }

    proptest! {
        #[test]
        fn generated_keys_stay_in_pool(key in key_strategy(5)) {
            let n: usize = key[1..].parse().unwrap();
            prop_assert!(n < 5);
        }

        #[test]
        fn generated_cities_are_known(human in human_strategy()) {
            prop_assert!(CITIES.contains(&human.city.as_str()));
        }
    }
}
