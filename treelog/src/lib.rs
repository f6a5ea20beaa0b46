//! Level-indexed storage for an append-only Merkle log.
//!
//! The log is a binary tree grown bottom-up. Each level is a dense,
//! independently addressable sequence of nodes kept in its own storage
//! bucket; a root bucket records which levels exist. Nothing is held in
//! memory between calls: every read reconstructs the shape of the log from
//! the transaction it is given.
//!
//! # Core types
//!
//! - [`Leaf`]: the opaque, versioned node payload and its wire encoding.
//! - [`LogStorage`]: maps coordinates to keys and enforces the append-only
//!   growth protocol inside a caller-owned transaction.
//! - [`LogStore`]: owns a [`Storage`] and wraps each operation in its own
//!   transaction, so an append's growth marker and node write commit or
//!   roll back together.
//! - [`LogConfig`]: bucket naming and leaf size limits.
//!
//! Hashing and proof construction are not part of this crate; they read and
//! write nodes through [`LogStorage`].

#![warn(missing_docs)]

mod config;
mod error;
pub mod keys;
mod leaf;
mod log_storage;
mod log_store;
#[cfg(test)]
mod test_utils;
#[cfg(test)]
mod tests;

pub use config::LogConfig;
pub use error::Error;
pub use leaf::{DEFAULT_MAX_LEAF_SIZE, LEAF_VERSION, Leaf};
pub use log_storage::{IMPLICIT_LEVELS, LEVEL_SIZE_FLOOR, LogStorage};
pub use log_store::LogStore;
pub use treelog_costs::{CostResult, CostsExt, OperationCost};
pub use treelog_storage::{MemoryStorage, Storage, Transaction};
