//! Storage errors

/// Errors returned by storage backends.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The bucket or key has no entry. The only error callers are expected
    /// to interpret; everything else is opaque.
    #[error("object not found")]
    ObjectNotFound,
    /// Generic backend failure
    #[error("storage error: {0}")]
    StorageError(String),
    /// A thread panicked while holding the storage lock
    #[error("storage lock poisoned")]
    PoisonedLock,
    /// Rocks DB error
    #[cfg(feature = "rocksdb_storage")]
    #[error("rocksDB error: {0}")]
    RocksDBError(#[from] rocksdb::Error),
}

impl Error {
    /// `true` for the distinguished absent condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::ObjectNotFound)
    }
}
