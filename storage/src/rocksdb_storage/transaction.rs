use rocksdb::{ColumnFamily, OptimisticTransactionDB};
use treelog_costs::{CostResult, CostsExt, OperationCost, cost_return_on_error_no_add};

use super::storage::COUNTS_CF_NAME;
use crate::{Error, Transaction};

pub(crate) type Tx<'db> = rocksdb::Transaction<'db, OptimisticTransactionDB>;

/// Key prefix shared by every entry of one bucket.
pub type BucketPrefix = [u8; 32];

/// Prefix under which `bucket`'s entries are stored.
pub fn bucket_prefix(bucket: &[u8]) -> BucketPrefix {
    *blake3::hash(bucket).as_bytes()
}

fn make_prefixed_key(prefix: &BucketPrefix, key: &[u8]) -> Vec<u8> {
    let mut prefixed_key = Vec::with_capacity(prefix.len() + key.len());
    prefixed_key.extend_from_slice(prefix);
    prefixed_key.extend_from_slice(key);
    prefixed_key
}

/// Transaction over [`super::RocksDbStorage`].
///
/// Entries live in the default column family under their bucket prefix.
/// The number of entries per bucket is kept in the `counts` column family,
/// keyed by the same prefix and updated in the same transaction, so `size`
/// is a point read.
pub struct RocksDbTransaction<'db> {
    db: &'db OptimisticTransactionDB,
    transaction: Tx<'db>,
}

impl<'db> RocksDbTransaction<'db> {
    pub(crate) fn new(db: &'db OptimisticTransactionDB) -> Self {
        Self {
            db,
            transaction: db.transaction(),
        }
    }

    pub(crate) fn inner(&self) -> &Tx<'db> {
        &self.transaction
    }

    pub(crate) fn into_inner(self) -> Tx<'db> {
        self.transaction
    }

    fn cf_counts(&self) -> Result<&'db ColumnFamily, Error> {
        self.db
            .cf_handle(COUNTS_CF_NAME)
            .ok_or_else(|| Error::StorageError(format!("column family {COUNTS_CF_NAME} is missing")))
    }

    fn entry_count(&self, prefix: &BucketPrefix) -> Result<u64, Error> {
        let Some(bytes) = self.transaction.get_cf(self.cf_counts()?, prefix)? else {
            return Ok(0);
        };
        let bytes: [u8; 8] = bytes.as_slice().try_into().map_err(|_| {
            Error::StorageError(format!("malformed entry count of {} bytes", bytes.len()))
        })?;
        Ok(u64::from_be_bytes(bytes))
    }
}

impl Transaction for RocksDbTransaction<'_> {
    fn get<B: AsRef<[u8]>, K: AsRef<[u8]>>(&self, bucket: B, key: K) -> CostResult<Vec<u8>, Error> {
        let key = make_prefixed_key(&bucket_prefix(bucket.as_ref()), key.as_ref());
        match self.transaction.get(key) {
            Ok(Some(value)) => {
                let cost = OperationCost::with_loaded_bytes(value.len() as u64);
                Ok(value).wrap_with_cost(cost)
            }
            Ok(None) => Err(Error::ObjectNotFound).wrap_with_cost(OperationCost::with_seek_count(1)),
            Err(e) => Err(Error::RocksDBError(e)).wrap_with_cost(OperationCost::with_seek_count(1)),
        }
    }

    /// Written bytes count the caller's key and value; the bucket prefix
    /// and the entry counter are reported as seeks.
    fn set<B: AsRef<[u8]>, K: AsRef<[u8]>>(
        &self,
        bucket: B,
        key: K,
        value: &[u8],
    ) -> CostResult<(), Error> {
        let mut cost =
            OperationCost::with_written_bytes((key.as_ref().len() + value.len()) as u64);
        let prefix = bucket_prefix(bucket.as_ref());
        let key = make_prefixed_key(&prefix, key.as_ref());

        cost.seek_count += 1;
        let existing = cost_return_on_error_no_add!(
            &cost,
            self.transaction.get(&key).map_err(Error::RocksDBError)
        );
        cost_return_on_error_no_add!(
            &cost,
            self.transaction.put(&key, value).map_err(Error::RocksDBError)
        );
        if existing.is_none() {
            cost.seek_count += 1;
            let count = cost_return_on_error_no_add!(&cost, self.entry_count(&prefix));
            let cf_counts = cost_return_on_error_no_add!(&cost, self.cf_counts());
            cost_return_on_error_no_add!(
                &cost,
                self.transaction
                    .put_cf(cf_counts, prefix, (count + 1).to_be_bytes())
                    .map_err(Error::RocksDBError)
            );
        }
        Ok(()).wrap_with_cost(cost)
    }

    fn size<B: AsRef<[u8]>>(&self, bucket: B) -> CostResult<u64, Error> {
        let cost = OperationCost::with_seek_count(1);
        match self.entry_count(&bucket_prefix(bucket.as_ref())) {
            Ok(0) => Err(Error::ObjectNotFound).wrap_with_cost(cost),
            Ok(count) => Ok(count).wrap_with_cost(cost),
            Err(e) => Err(e).wrap_with_cost(cost),
        }
    }
}
