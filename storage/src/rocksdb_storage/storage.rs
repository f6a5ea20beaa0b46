//! Implementation of the storage abstraction over RocksDB.
use std::path::Path;

use lazy_static::lazy_static;
use rocksdb::{ColumnFamilyDescriptor, OptimisticTransactionDB};
use tracing::debug;
use treelog_costs::{CostResult, CostsExt, OperationCost};

use super::RocksDbTransaction;
use crate::{Error, Storage};

/// Name of column family holding per-bucket entry counts
pub(super) const COUNTS_CF_NAME: &str = "counts";

lazy_static! {
    static ref DEFAULT_OPTS: rocksdb::Options = {
        let mut opts = rocksdb::Options::default();
        opts.create_if_missing(true);
        opts.increase_parallelism(num_cpus::get() as i32);
        opts.set_allow_mmap_writes(true);
        opts.set_allow_mmap_reads(true);
        opts.create_missing_column_families(true);
        opts.set_atomic_flush(true);
        opts
    };
}

/// Storage which uses RocksDB as its backend.
pub struct RocksDbStorage {
    db: OptimisticTransactionDB,
}

impl RocksDbStorage {
    /// Open (or create) a database at `path` with default options.
    pub fn default_rocksdb_with_path<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let db = OptimisticTransactionDB::open_cf_descriptors(
            &DEFAULT_OPTS,
            &path,
            [ColumnFamilyDescriptor::new(
                COUNTS_CF_NAME,
                DEFAULT_OPTS.clone(),
            )],
        )?;
        debug!(path = %path.as_ref().display(), "opened rocksdb storage");
        Ok(RocksDbStorage { db })
    }
}

impl<'db> Storage<'db> for RocksDbStorage {
    type Transaction = RocksDbTransaction<'db>;

    fn start_transaction(&'db self) -> Self::Transaction {
        RocksDbTransaction::new(&self.db)
    }

    fn commit_transaction(&self, transaction: Self::Transaction) -> CostResult<(), Error> {
        transaction
            .into_inner()
            .commit()
            .map_err(Error::RocksDBError)
            .wrap_with_cost(OperationCost::default())
    }

    fn rollback_transaction(&self, transaction: &Self::Transaction) -> Result<(), Error> {
        transaction.inner().rollback().map_err(Error::RocksDBError)
    }

    fn flush(&self) -> Result<(), Error> {
        self.db.flush().map_err(Error::RocksDBError)
    }
}
