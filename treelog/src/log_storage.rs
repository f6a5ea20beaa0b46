//! The log storage engine.
//!
//! Maps `(level, index)` coordinates onto buckets of a [`Transaction`] and
//! implements the append-only growth protocol:
//!
//! - level 0 always exists; every other level exists once the root bucket
//!   holds a marker for it,
//! - a level is created only by appending to the frontier level
//!   (`level == height`), never by skipping ahead,
//! - nodes within a level are written at `entry_count(level)`, so indices
//!   stay contiguous from 0.
//!
//! An append issues two writes (marker, node). The engine does not commit
//! anything; the caller must run it inside a transaction it commits or
//! rolls back as a unit. [`crate::LogStore`] does this for you.

use std::ops::Range;

use tracing::{debug, trace};
use treelog_costs::{
    CostResult, CostsExt, OperationCost, cost_return_on_error, cost_return_on_error_no_add,
};
use treelog_storage::Transaction;

use crate::{
    Error, Leaf, LogConfig,
    keys::{LEVEL_MARKER, index_key},
};

/// Levels that exist without a marker in the root bucket.
pub const IMPLICIT_LEVELS: u64 = 1;

/// Smallest value [`LogStorage::level_size`] reports.
pub const LEVEL_SIZE_FLOOR: u64 = 1;

/// Level-indexed view of a log inside a single transaction.
#[derive(Debug)]
pub struct LogStorage<'a, T> {
    transaction: &'a T,
    config: LogConfig,
}

impl<'a, T: Transaction> LogStorage<'a, T> {
    /// Engine over `transaction` with the default bucket layout.
    pub fn new(transaction: &'a T) -> Self {
        Self {
            transaction,
            config: LogConfig::default(),
        }
    }

    /// Engine over `transaction` with a custom layout.
    pub fn with_config(transaction: &'a T, config: LogConfig) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self::from_validated(transaction, config))
    }

    pub(crate) fn from_validated(transaction: &'a T, config: LogConfig) -> Self {
        Self {
            transaction,
            config,
        }
    }

    /// The layout this engine reads and writes.
    pub fn config(&self) -> &LogConfig {
        &self.config
    }

    /// Number of entries in `bucket`; an absent bucket is empty.
    fn population(&self, bucket: &[u8]) -> CostResult<u64, Error> {
        self.transaction.size(bucket).map(|result| match result {
            Ok(count) => Ok(count),
            Err(e) if e.is_not_found() => Ok(0),
            Err(e) => Err(Error::StoreFault(e)),
        })
    }

    /// Number of levels in the log, at least 1.
    pub fn height(&self) -> CostResult<u64, Error> {
        self.population(self.config.root_bucket.as_bytes())
            .map_ok(|markers| IMPLICIT_LEVELS + markers)
    }

    /// Number of nodes stored at `level`; 0 for a level that does not exist.
    pub fn entry_count(&self, level: u64) -> CostResult<u64, Error> {
        self.population(&self.config.level_bucket(level))
    }

    /// Size of `level`, reported as at least [`LEVEL_SIZE_FLOOR`].
    ///
    /// Use [`LogStorage::entry_count`] for index arithmetic; an empty level
    /// also reports a size of 1 here.
    pub fn level_size(&self, level: u64) -> CostResult<u64, Error> {
        self.entry_count(level)
            .map_ok(|count| count.max(LEVEL_SIZE_FLOOR))
    }

    /// Read the node at `(level, index)`.
    pub fn get(&self, level: u64, index: u64) -> CostResult<Leaf, Error> {
        let mut cost = OperationCost::default();
        let count = cost_return_on_error!(&mut cost, self.entry_count(level));
        if index >= count {
            return Err(Error::InvalidCoordinate(format!(
                "index {} outside level {} holding {} nodes",
                index, level, count
            )))
            .wrap_with_cost(cost);
        }
        self.read_node(level, index).add_cost(cost)
    }

    /// Read the nodes of `level` in `range`, all of which must exist.
    pub fn get_range(&self, level: u64, range: Range<u64>) -> CostResult<Vec<Leaf>, Error> {
        let mut cost = OperationCost::default();
        if range.start > range.end {
            return Err(Error::InvalidCoordinate(format!(
                "reversed range {}..{}",
                range.start, range.end
            )))
            .wrap_with_cost(cost);
        }
        let count = cost_return_on_error!(&mut cost, self.entry_count(level));
        if range.end > count {
            return Err(Error::InvalidCoordinate(format!(
                "range {}..{} outside level {} holding {} nodes",
                range.start, range.end, level, count
            )))
            .wrap_with_cost(cost);
        }

        let mut leaves = Vec::with_capacity((range.end - range.start) as usize);
        for index in range {
            leaves.push(cost_return_on_error!(
                &mut cost,
                self.read_node(level, index)
            ));
        }
        Ok(leaves).wrap_with_cost(cost)
    }

    /// The newest node of `level`, if it has any.
    pub fn last(&self, level: u64) -> CostResult<Option<Leaf>, Error> {
        let mut cost = OperationCost::default();
        let count = cost_return_on_error!(&mut cost, self.entry_count(level));
        if count == 0 {
            return Ok(None).wrap_with_cost(cost);
        }
        self.read_node(level, count - 1)
            .map_ok(Some)
            .add_cost(cost)
    }

    /// Confirm every index of `level` is stored and decodes. Returns the
    /// number of nodes checked.
    pub fn check_level(&self, level: u64) -> CostResult<u64, Error> {
        let mut cost = OperationCost::default();
        let count = cost_return_on_error!(&mut cost, self.entry_count(level));
        for index in 0..count {
            cost_return_on_error!(&mut cost, self.read_node(level, index));
        }
        Ok(count).wrap_with_cost(cost)
    }

    /// Append `leaf` to `level` and return the index it was written at.
    ///
    /// Appending to the frontier level (`level == height`) creates it and
    /// grows the height by one. Levels above the frontier are rejected.
    pub fn append(&self, level: u64, leaf: &Leaf) -> CostResult<u64, Error> {
        let mut cost = OperationCost::default();

        if leaf.payload().len() > self.config.max_leaf_size {
            return Err(Error::EncodeFault(format!(
                "leaf payload of {} bytes exceeds limit of {}",
                leaf.payload().len(),
                self.config.max_leaf_size
            )))
            .wrap_with_cost(cost);
        }
        let encoded = cost_return_on_error_no_add!(&cost, leaf.encode());

        let height = cost_return_on_error!(&mut cost, self.height());
        if level > height {
            return Err(Error::InvalidCoordinate(format!(
                "level {} is above the frontier level {}",
                level, height
            )))
            .wrap_with_cost(cost);
        }
        if level == height {
            cost_return_on_error!(
                &mut cost,
                self.transaction
                    .set(
                        self.config.root_bucket.as_bytes(),
                        index_key(height),
                        LEVEL_MARKER
                    )
                    .map_err(Error::StoreFault)
            );
            debug!(level, height = height + 1, "created log level");
        }

        let index = cost_return_on_error!(&mut cost, self.entry_count(level));
        cost_return_on_error!(
            &mut cost,
            self.transaction
                .set(self.config.level_bucket(level), index_key(index), &encoded)
                .map_err(Error::StoreFault)
        );
        trace!(level, index, bytes = encoded.len(), "appended log node");

        Ok(index).wrap_with_cost(cost)
    }

    fn read_node(&self, level: u64, index: u64) -> CostResult<Leaf, Error> {
        self.transaction
            .get(self.config.level_bucket(level), index_key(index))
            .map(|result| match result {
                Ok(bytes) => Leaf::decode_with_limit(&bytes, self.config.max_leaf_size),
                Err(e) if e.is_not_found() => Err(Error::Absent { level, index }),
                Err(e) => Err(Error::StoreFault(e)),
            })
    }
}
