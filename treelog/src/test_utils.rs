//! Failure injection for engine and store tests.

use std::cell::RefCell;

use treelog_costs::{CostResult, CostsExt, OperationCost};
use treelog_storage::{Error, MemoryStorage, MemoryTransaction, Storage, Transaction};

/// Memory storage whose transactions fail on demand.
#[derive(Default)]
pub(crate) struct FailingStorage {
    pub inner: MemoryStorage,
    fail_set_on: RefCell<Option<Vec<u8>>>,
    fail_size_on: RefCell<Option<Vec<u8>>>,
    fail_get_on: RefCell<Option<Vec<u8>>>,
}

impl FailingStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `set` into `bucket` fails from now on.
    pub fn fail_set_on(&self, bucket: &[u8]) {
        *self.fail_set_on.borrow_mut() = Some(bucket.to_vec());
    }

    /// Every `size` of `bucket` fails from now on.
    pub fn fail_size_on(&self, bucket: &[u8]) {
        *self.fail_size_on.borrow_mut() = Some(bucket.to_vec());
    }

    /// Every `get` from `bucket` fails from now on.
    pub fn fail_get_on(&self, bucket: &[u8]) {
        *self.fail_get_on.borrow_mut() = Some(bucket.to_vec());
    }

    pub fn heal(&self) {
        self.fail_set_on.borrow_mut().take();
        self.fail_size_on.borrow_mut().take();
        self.fail_get_on.borrow_mut().take();
    }

    fn trips(rule: &RefCell<Option<Vec<u8>>>, bucket: &[u8]) -> bool {
        rule.borrow().as_deref() == Some(bucket)
    }
}

pub(crate) struct FailingTransaction<'db> {
    inner: MemoryTransaction<'db>,
    storage: &'db FailingStorage,
}

impl FailingTransaction<'_> {
    /// Write through the underlying transaction, bypassing failure rules.
    pub fn raw(&self) -> &MemoryTransaction<'_> {
        &self.inner
    }
}

impl Transaction for FailingTransaction<'_> {
    fn get<B: AsRef<[u8]>, K: AsRef<[u8]>>(&self, bucket: B, key: K) -> CostResult<Vec<u8>, Error> {
        if FailingStorage::trips(&self.storage.fail_get_on, bucket.as_ref()) {
            return Err(Error::StorageError("simulated get failure".into()))
                .wrap_with_cost(OperationCost::default());
        }
        self.inner.get(bucket, key)
    }

    fn set<B: AsRef<[u8]>, K: AsRef<[u8]>>(
        &self,
        bucket: B,
        key: K,
        value: &[u8],
    ) -> CostResult<(), Error> {
        if FailingStorage::trips(&self.storage.fail_set_on, bucket.as_ref()) {
            return Err(Error::StorageError("simulated set failure".into()))
                .wrap_with_cost(OperationCost::default());
        }
        self.inner.set(bucket, key, value)
    }

    fn size<B: AsRef<[u8]>>(&self, bucket: B) -> CostResult<u64, Error> {
        if FailingStorage::trips(&self.storage.fail_size_on, bucket.as_ref()) {
            return Err(Error::StorageError("simulated size failure".into()))
                .wrap_with_cost(OperationCost::default());
        }
        self.inner.size(bucket)
    }
}

impl<'db> Storage<'db> for FailingStorage {
    type Transaction = FailingTransaction<'db>;

    fn start_transaction(&'db self) -> Self::Transaction {
        FailingTransaction {
            inner: self.inner.start_transaction(),
            storage: self,
        }
    }

    fn commit_transaction(&self, transaction: Self::Transaction) -> CostResult<(), Error> {
        self.inner.commit_transaction(transaction.inner)
    }

    fn rollback_transaction(&self, transaction: &Self::Transaction) -> Result<(), Error> {
        self.inner.rollback_transaction(&transaction.inner)
    }

    fn flush(&self) -> Result<(), Error> {
        self.inner.flush()
    }
}
