#![deny(missing_docs)]
//! Cost accounting shared by the treelog storage backends and the log
//! engine.
//!
//! Every storage call returns its value together with the I/O it caused,
//! so callers can price a whole transaction without instrumenting the
//! backend.

mod context;

use std::ops::{Add, AddAssign};

pub use context::{CostContext, CostResult, CostsExt};

/// Approximate resources touched by an operation.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub struct OperationCost {
    /// Storage seeks (point reads and bucket scans).
    pub seek_count: u32,
    /// Bytes read back from storage.
    pub storage_loaded_bytes: u64,
    /// Bytes handed to storage for writing, keys included.
    pub storage_written_bytes: u64,
}

impl OperationCost {
    /// Cost of `seek_count` seeks and nothing else.
    pub fn with_seek_count(seek_count: u32) -> Self {
        OperationCost {
            seek_count,
            ..Default::default()
        }
    }

    /// Cost of one seek that loaded `storage_loaded_bytes`.
    pub fn with_loaded_bytes(storage_loaded_bytes: u64) -> Self {
        OperationCost {
            seek_count: 1,
            storage_loaded_bytes,
            ..Default::default()
        }
    }

    /// Cost of writing `storage_written_bytes`.
    pub fn with_written_bytes(storage_written_bytes: u64) -> Self {
        OperationCost {
            storage_written_bytes,
            ..Default::default()
        }
    }
}

impl Add for OperationCost {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        OperationCost {
            seek_count: self.seek_count + rhs.seek_count,
            storage_loaded_bytes: self.storage_loaded_bytes + rhs.storage_loaded_bytes,
            storage_written_bytes: self.storage_written_bytes + rhs.storage_written_bytes,
        }
    }
}

impl AddAssign for OperationCost {
    fn add_assign(&mut self, rhs: Self) {
        self.seek_count += rhs.seek_count;
        self.storage_loaded_bytes += rhs.storage_loaded_bytes;
        self.storage_written_bytes += rhs.storage_written_bytes;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_assign_accumulates_every_field() {
        let mut acc = OperationCost::with_seek_count(2);
        acc += OperationCost::with_loaded_bytes(10);
        acc += OperationCost::with_written_bytes(7);
        assert_eq!(
            acc,
            OperationCost {
                seek_count: 3,
                storage_loaded_bytes: 10,
                storage_written_bytes: 7,
            }
        );
        assert_eq!(acc + OperationCost::default(), acc);
    }
}
