//! In-memory storage backend.
//!
//! Committed buckets live behind an `RwLock`. Every transaction keeps its
//! own write overlay; reads consult the overlay first and then the committed
//! state, so a transaction sees its own writes plus whatever other
//! transactions have committed.
//!
//! Concurrency control is optimistic, like RocksDB's
//! `OptimisticTransactionDB`: each committed bucket carries a version, a
//! transaction remembers the version of every bucket it touched, and commit
//! fails if any of them has moved on since.

use std::{
    cell::RefCell,
    collections::BTreeMap,
    sync::{RwLock, RwLockReadGuard},
};

use tracing::{debug, trace};
use treelog_costs::{CostResult, CostsExt, OperationCost};

use crate::{Error, Storage, Transaction};

type Bucket = BTreeMap<Vec<u8>, Vec<u8>>;
type Buckets = BTreeMap<Vec<u8>, Bucket>;

#[derive(Debug, Default)]
struct Committed {
    buckets: Buckets,
    versions: BTreeMap<Vec<u8>, u64>,
}

impl Committed {
    fn version(&self, bucket: &[u8]) -> u64 {
        self.versions.get(bucket).copied().unwrap_or_default()
    }
}

/// Storage held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    state: RwLock<Committed>,
}

impl MemoryStorage {
    /// Create empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    fn committed(&self) -> Result<RwLockReadGuard<'_, Committed>, Error> {
        self.state.read().map_err(|_| Error::PoisonedLock)
    }

    /// Number of committed entries in `bucket`, ignoring any open
    /// transaction.
    pub fn committed_len<B: AsRef<[u8]>>(&self, bucket: B) -> Result<u64, Error> {
        Ok(self
            .committed()?
            .buckets
            .get(bucket.as_ref())
            .map_or(0, |b| b.len() as u64))
    }
}

/// Transaction over [`MemoryStorage`].
#[derive(Debug)]
pub struct MemoryTransaction<'db> {
    storage: &'db MemoryStorage,
    writes: RefCell<Buckets>,
    observed: RefCell<BTreeMap<Vec<u8>, u64>>,
}

impl MemoryTransaction<'_> {
    /// Number of buffered writes.
    pub fn pending_writes(&self) -> usize {
        self.writes.borrow().values().map(BTreeMap::len).sum()
    }

    /// Remember the committed version of `bucket` the first time it is
    /// touched.
    fn observe(&self, committed: &Committed, bucket: &[u8]) {
        self.observed
            .borrow_mut()
            .entry(bucket.to_vec())
            .or_insert_with(|| committed.version(bucket));
    }
}

impl Transaction for MemoryTransaction<'_> {
    fn get<B: AsRef<[u8]>, K: AsRef<[u8]>>(&self, bucket: B, key: K) -> CostResult<Vec<u8>, Error> {
        let (bucket, key) = (bucket.as_ref(), key.as_ref());
        let committed = match self.storage.committed() {
            Ok(committed) => committed,
            Err(e) => return Err(e).wrap_with_cost(OperationCost::with_seek_count(1)),
        };
        self.observe(&committed, bucket);
        let pending = self
            .writes
            .borrow()
            .get(bucket)
            .and_then(|b| b.get(key))
            .cloned();
        let value =
            pending.or_else(|| committed.buckets.get(bucket).and_then(|b| b.get(key)).cloned());
        match value {
            Some(value) => {
                let cost = OperationCost::with_loaded_bytes(value.len() as u64);
                Ok(value).wrap_with_cost(cost)
            }
            None => Err(Error::ObjectNotFound).wrap_with_cost(OperationCost::with_seek_count(1)),
        }
    }

    fn set<B: AsRef<[u8]>, K: AsRef<[u8]>>(
        &self,
        bucket: B,
        key: K,
        value: &[u8],
    ) -> CostResult<(), Error> {
        let (bucket, key) = (bucket.as_ref(), key.as_ref());
        let cost = OperationCost::with_written_bytes((key.len() + value.len()) as u64);
        match self.storage.committed() {
            Ok(committed) => self.observe(&committed, bucket),
            Err(e) => return Err(e).wrap_with_cost(cost),
        }
        self.writes
            .borrow_mut()
            .entry(bucket.to_vec())
            .or_default()
            .insert(key.to_vec(), value.to_vec());
        Ok(()).wrap_with_cost(cost)
    }

    fn size<B: AsRef<[u8]>>(&self, bucket: B) -> CostResult<u64, Error> {
        let bucket = bucket.as_ref();
        let cost = OperationCost::with_seek_count(1);
        let committed = match self.storage.committed() {
            Ok(committed) => committed,
            Err(e) => return Err(e).wrap_with_cost(cost),
        };
        self.observe(&committed, bucket);
        let committed_bucket = committed.buckets.get(bucket);
        let mut count = committed_bucket.map_or(0, |b| b.len() as u64);
        if let Some(pending) = self.writes.borrow().get(bucket) {
            count += pending
                .keys()
                .filter(|k| !committed_bucket.is_some_and(|b| b.contains_key(*k)))
                .count() as u64;
        }
        if count == 0 {
            Err(Error::ObjectNotFound).wrap_with_cost(cost)
        } else {
            Ok(count).wrap_with_cost(cost)
        }
    }
}

impl<'db> Storage<'db> for MemoryStorage {
    type Transaction = MemoryTransaction<'db>;

    fn start_transaction(&'db self) -> Self::Transaction {
        MemoryTransaction {
            storage: self,
            writes: RefCell::default(),
            observed: RefCell::default(),
        }
    }

    fn commit_transaction(&self, transaction: Self::Transaction) -> CostResult<(), Error> {
        let writes = transaction.writes.into_inner();
        let observed = transaction.observed.into_inner();
        let mut committed = match self.state.write() {
            Ok(committed) => committed,
            Err(_) => return Err(Error::PoisonedLock).wrap_with_cost(OperationCost::default()),
        };
        if let Some((bucket, seen)) = observed
            .iter()
            .find(|(bucket, seen)| committed.version(bucket) != **seen)
        {
            debug!(
                bucket = %String::from_utf8_lossy(bucket),
                seen,
                current = committed.version(bucket),
                "memory transaction conflict"
            );
            return Err(Error::StorageError("transaction conflict".to_string()))
                .wrap_with_cost(OperationCost::default());
        }

        let mut applied = 0;
        for (bucket, entries) in writes {
            if entries.is_empty() {
                continue;
            }
            applied += entries.len();
            *committed.versions.entry(bucket.clone()).or_default() += 1;
            committed.buckets.entry(bucket).or_default().extend(entries);
        }
        trace!(applied, "committed memory transaction");
        Ok(()).wrap_with_cost(OperationCost::default())
    }

    fn rollback_transaction(&self, transaction: &Self::Transaction) -> Result<(), Error> {
        transaction.writes.borrow_mut().clear();
        transaction.observed.borrow_mut().clear();
        Ok(())
    }

    fn flush(&self) -> Result<(), Error> {
        Ok(())
    }
}
