//! Transaction-owning wrapper around [`LogStorage`].

use std::ops::Range;

use tracing::{debug, warn};
use treelog_costs::{CostResult, CostsExt, OperationCost, cost_return_on_error};
use treelog_storage::Storage;

use crate::{Error, Leaf, LogConfig, LogStorage};

/// A log that owns its storage and runs every operation in a transaction of
/// its own.
///
/// Writes commit only if every step succeeds, so an append never leaves a
/// level marker without its node. Reads run in a transaction that is
/// dropped without committing.
#[derive(Debug)]
pub struct LogStore<S> {
    storage: S,
    config: LogConfig,
}

impl<S> LogStore<S> {
    /// Log over `storage` with the default bucket layout.
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            config: LogConfig::default(),
        }
    }

    /// Log over `storage` with a custom layout.
    pub fn with_config(storage: S, config: LogConfig) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self { storage, config })
    }

    /// The underlying storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// The bucket layout of this log.
    pub fn config(&self) -> &LogConfig {
        &self.config
    }

    /// Give the storage back.
    pub fn into_inner(self) -> S {
        self.storage
    }
}

impl<'db, S: Storage<'db>> LogStore<S> {
    /// Run `f` in a fresh transaction. The transaction commits if `f`
    /// returns `Ok` and is rolled back otherwise.
    pub fn transaction<R>(
        &'db self,
        f: impl FnOnce(&LogStorage<'_, S::Transaction>) -> CostResult<R, Error>,
    ) -> CostResult<R, Error> {
        let mut cost = OperationCost::default();
        let transaction = self.storage.start_transaction();
        let result = {
            let log = LogStorage::from_validated(&transaction, self.config.clone());
            f(&log).unwrap_add_cost(&mut cost)
        };

        match result {
            Ok(value) => {
                cost_return_on_error!(
                    &mut cost,
                    self.storage
                        .commit_transaction(transaction)
                        .map_err(Error::StoreFault)
                );
                debug!(
                    seeks = cost.seek_count,
                    written = cost.storage_written_bytes,
                    "committed log transaction"
                );
                Ok(value).wrap_with_cost(cost)
            }
            Err(e) => {
                warn!(error = %e, "rolling back log transaction");
                if let Err(rollback) = self.storage.rollback_transaction(&transaction) {
                    warn!(error = %rollback, "log transaction rollback failed");
                }
                Err(e).wrap_with_cost(cost)
            }
        }
    }

    fn read<R>(
        &'db self,
        f: impl FnOnce(&LogStorage<'_, S::Transaction>) -> CostResult<R, Error>,
    ) -> CostResult<R, Error> {
        let transaction = self.storage.start_transaction();
        let log = LogStorage::from_validated(&transaction, self.config.clone());
        f(&log)
    }

    /// Append `leaf` to `level` atomically and return its index.
    pub fn append(&'db self, level: u64, leaf: &Leaf) -> CostResult<u64, Error> {
        self.transaction(|log| log.append(level, leaf))
    }

    /// Append `leaves` to `level` in one transaction and return the indices
    /// they occupy. Either all of them are stored or none.
    pub fn append_batch(&'db self, level: u64, leaves: &[Leaf]) -> CostResult<Range<u64>, Error> {
        self.transaction(|log| {
            let mut cost = OperationCost::default();
            let Some((first, rest)) = leaves.split_first() else {
                return log.entry_count(level).map_ok(|count| count..count);
            };
            let start = cost_return_on_error!(&mut cost, log.append(level, first));
            for leaf in rest {
                cost_return_on_error!(&mut cost, log.append(level, leaf));
            }
            Ok(start..start + leaves.len() as u64).wrap_with_cost(cost)
        })
    }

    /// Number of levels in the log, at least 1.
    pub fn height(&'db self) -> CostResult<u64, Error> {
        self.read(|log| log.height())
    }

    /// Size of `level`, at least 1.
    pub fn level_size(&'db self, level: u64) -> CostResult<u64, Error> {
        self.read(|log| log.level_size(level))
    }

    /// Number of nodes stored at `level`.
    pub fn entry_count(&'db self, level: u64) -> CostResult<u64, Error> {
        self.read(|log| log.entry_count(level))
    }

    /// Read the node at `(level, index)`.
    pub fn get(&'db self, level: u64, index: u64) -> CostResult<Leaf, Error> {
        self.read(|log| log.get(level, index))
    }

    /// Read the nodes of `level` in `range`.
    pub fn get_range(&'db self, level: u64, range: Range<u64>) -> CostResult<Vec<Leaf>, Error> {
        self.read(|log| log.get_range(level, range))
    }

    /// The newest node of `level`.
    pub fn last(&'db self, level: u64) -> CostResult<Option<Leaf>, Error> {
        self.read(|log| log.last(level))
    }

    /// Verify every node of `level` is present and decodes.
    pub fn check_level(&'db self, level: u64) -> CostResult<u64, Error> {
        self.read(|log| log.check_level(level))
    }

    /// Flush the storage to durable media.
    pub fn flush(&'db self) -> Result<(), Error> {
        self.storage.flush().map_err(Error::StoreFault)
    }
}
