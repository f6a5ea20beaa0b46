//! Useful utilities for testing.

use std::ops::Deref;

use tempfile::TempDir;
use treelog_costs::CostResult;

use super::*;
use crate::{Error, Storage};

/// RocksDb storage with self-cleanup
pub struct TempStorage {
    storage: RocksDbStorage,
    _dir: TempDir,
}

impl TempStorage {
    /// Create new `TempStorage`
    pub fn new() -> Self {
        let dir = TempDir::new().expect("cannot create tempdir");
        let storage = RocksDbStorage::default_rocksdb_with_path(dir.path())
            .expect("cannot open RocksDB storage");
        TempStorage { storage, _dir: dir }
    }
}

impl Default for TempStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for TempStorage {
    type Target = RocksDbStorage;

    fn deref(&self) -> &Self::Target {
        &self.storage
    }
}

impl<'db> Storage<'db> for TempStorage {
    type Transaction = RocksDbTransaction<'db>;

    fn start_transaction(&'db self) -> Self::Transaction {
        self.storage.start_transaction()
    }

    fn commit_transaction(&self, transaction: Self::Transaction) -> CostResult<(), Error> {
        self.storage.commit_transaction(transaction)
    }

    fn rollback_transaction(&self, transaction: &Self::Transaction) -> Result<(), Error> {
        self.storage.rollback_transaction(transaction)
    }

    fn flush(&self) -> Result<(), Error> {
        self.storage.flush()
    }
}
