#![deny(missing_docs)]

//! Transactional, bucketed key-value storage for the treelog engine.
//!
//! The engine only ever talks to a [`Transaction`]: point reads, upserts
//! and per-bucket entry counts. Opening, committing and rolling back
//! transactions is the [`Storage`] owner's business.

mod error;
mod memory_storage;
#[cfg(feature = "rocksdb_storage")]
pub mod rocksdb_storage;
mod storage;

pub use crate::{
    error::Error,
    memory_storage::{MemoryStorage, MemoryTransaction},
    storage::{Storage, Transaction},
};
