//! Storage backend over RocksDB optimistic transactions.
//!
//! Buckets share one keyspace: every key is stored as
//! `blake3(bucket) || key`, so a bucket's entries are contiguous and can be
//! counted with a single prefix scan.
mod storage;
pub mod test_utils;
mod transaction;

pub use self::{
    storage::RocksDbStorage,
    transaction::{BucketPrefix, RocksDbTransaction, bucket_prefix},
};
