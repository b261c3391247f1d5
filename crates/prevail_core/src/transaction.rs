//! Transaction batching.

use crate::error::{CoreError, CoreResult};
use crate::record::{Entity, Record};
use std::sync::Arc;

/// State of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    /// Transaction is active and can enqueue operations.
    Active,
    /// Transaction has been committed.
    Committed,
}

/// A pending store mutation.
#[derive(Debug, Clone)]
pub enum Operation {
    /// Insert or fully replace the record under a key.
    Set {
        /// Record key.
        key: String,
        /// New record.
        record: Arc<dyn Record>,
    },
    /// Remove the record under a key, if any.
    Delete {
        /// Record key.
        key: String,
    },
}

impl Operation {
    /// Returns the key the operation targets.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Operation::Set { key, .. } | Operation::Delete { key } => key,
        }
    }
}

/// An ordered batch of pending operations.
///
/// Nothing enqueued is visible to readers until the transaction is passed
/// to [`Database::commit`](crate::Database::commit), which applies every
/// operation in enqueue order under the store's write lock.
///
/// ```rust,ignore
/// let mut txn = db.begin();
/// txn.set("1", alice).set("2", bob).delete("3");
/// db.commit(&mut txn)?;
/// ```
#[derive(Debug)]
pub struct Transaction {
    state: TransactionState,
    operations: Vec<Operation>,
}

impl Transaction {
    pub(crate) fn new() -> Self {
        Self {
            state: TransactionState::Active,
            operations: Vec::new(),
        }
    }

    /// Enqueues a set of `key` to `value`.
    pub fn set<T: Entity>(&mut self, key: impl Into<String>, value: T) -> &mut Self {
        self.set_record(key, Arc::new(value))
    }

    /// Enqueues a set of `key` to an already type-erased record.
    pub fn set_record(&mut self, key: impl Into<String>, record: Arc<dyn Record>) -> &mut Self {
        self.operations.push(Operation::Set {
            key: key.into(),
            record,
        });
        self
    }

    /// Enqueues a delete of `key`.
    pub fn delete(&mut self, key: impl Into<String>) -> &mut Self {
        self.operations.push(Operation::Delete { key: key.into() });
        self
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> TransactionState {
        self.state
    }

    /// Checks if the transaction is still active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state == TransactionState::Active
    }

    /// Returns the enqueued operations in order.
    #[must_use]
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Returns the number of enqueued operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Returns true if nothing is enqueued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub(crate) fn ensure_active(&self) -> CoreResult<()> {
        if self.is_active() {
            Ok(())
        } else {
            Err(CoreError::invalid_operation(format!(
                "transaction is not active (state: {:?})",
                self.state
            )))
        }
    }

    /// Marks the transaction committed and hands over its operations.
    pub(crate) fn take_operations(&mut self) -> Vec<Operation> {
        self.state = TransactionState::Committed;
        std::mem::take(&mut self.operations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Field;
    use prevail_codec::FieldValue;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Counter {
        n: i64,
    }

    impl Entity for Counter {
        const NAMESPACE: &'static str = "";
        const NAME: &'static str = "Counter";
        const FIELDS: &'static [Field<Self>] = &[Field::new("n", |c: &Counter| FieldValue::from(c.n))];
    }

    #[test]
    fn operations_keep_enqueue_order() {
        let mut txn = Transaction::new();
        txn.set("a", Counter { n: 1 })
            .delete("b")
            .set("a", Counter { n: 2 });

        let keys: Vec<_> = txn.operations().iter().map(Operation::key).collect();
        assert_eq!(keys, ["a", "b", "a"]);
        assert!(matches!(txn.operations()[1], Operation::Delete { .. }));
        assert_eq!(txn.len(), 3);
    }

    #[test]
    fn committed_transaction_is_inactive() {
        let mut txn = Transaction::new();
        txn.delete("x");
        assert!(txn.ensure_active().is_ok());

        let ops = txn.take_operations();
        assert_eq!(ops.len(), 1);
        assert!(txn.is_empty());
        assert_eq!(txn.state(), TransactionState::Committed);
        assert!(matches!(
            txn.ensure_active(),
            Err(CoreError::InvalidOperation { .. })
        ));
    }
}
