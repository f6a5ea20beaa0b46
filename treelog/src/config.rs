//! Log configuration.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    keys::{self, DEFAULT_LEVEL_BUCKET_PREFIX, DEFAULT_ROOT_BUCKET},
    leaf::DEFAULT_MAX_LEAF_SIZE,
};

/// Configuration for a log
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct LogConfig {
    /// Bucket holding level markers (default: "log-root")
    pub root_bucket: String,

    /// Prefix of per-level buckets (default: "log-")
    pub level_bucket_prefix: String,

    /// Largest payload accepted on append and on decode (default: 16MB)
    pub max_leaf_size: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            root_bucket: DEFAULT_ROOT_BUCKET.to_string(),
            level_bucket_prefix: DEFAULT_LEVEL_BUCKET_PREFIX.to_string(),
            max_leaf_size: DEFAULT_MAX_LEAF_SIZE,
        }
    }
}

impl LogConfig {
    /// Create a config with the default bucket layout
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a config whose buckets are all prefixed with `namespace`, so
    /// several logs can share one store.
    pub fn namespaced(namespace: &str) -> Self {
        Self {
            root_bucket: format!("{namespace}/{DEFAULT_ROOT_BUCKET}"),
            level_bucket_prefix: format!("{namespace}/{DEFAULT_LEVEL_BUCKET_PREFIX}"),
            ..Default::default()
        }
    }

    /// Set the root bucket name
    pub fn root_bucket(mut self, name: impl Into<String>) -> Self {
        self.root_bucket = name.into();
        self
    }

    /// Set the level bucket prefix
    pub fn level_bucket_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.level_bucket_prefix = prefix.into();
        self
    }

    /// Set the largest accepted payload size
    pub fn max_leaf_size(mut self, size: usize) -> Self {
        self.max_leaf_size = size;
        self
    }

    /// Bucket holding the nodes of `level`.
    pub fn level_bucket(&self, level: u64) -> Vec<u8> {
        keys::level_bucket(&self.level_bucket_prefix, level)
    }

    /// Reject layouts where the root bucket could be mistaken for a level
    /// bucket, and size limits the leaf codec cannot honour.
    pub fn validate(&self) -> Result<(), Error> {
        if self.root_bucket.is_empty() {
            return Err(Error::InvalidConfig("root bucket name is empty".to_string()));
        }
        if let Some(suffix) = self.root_bucket.strip_prefix(&self.level_bucket_prefix) {
            if !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()) {
                return Err(Error::InvalidConfig(format!(
                    "root bucket {:?} collides with the buckets of prefix {:?}",
                    self.root_bucket, self.level_bucket_prefix
                )));
            }
        }
        if self.max_leaf_size == 0 || self.max_leaf_size > DEFAULT_MAX_LEAF_SIZE {
            return Err(Error::InvalidConfig(format!(
                "max leaf size must be within 1..={DEFAULT_MAX_LEAF_SIZE}, got {}",
                self.max_leaf_size
            )));
        }
        Ok(())
    }
}
