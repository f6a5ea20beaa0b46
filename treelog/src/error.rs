//! Errors of the log engine.

/// Everything that can go wrong reading or growing the log.
///
/// An absent bucket while counting levels or entries is not an error: it is
/// read as an empty namespace. Every other failure is returned to the owner
/// of the transaction, who decides whether to retry or abort.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The level claims the node exists but the store has no entry for it.
    #[error("no node stored at level {level} index {index}")]
    Absent {
        /// Level of the missing node
        level: u64,
        /// Index of the missing node
        index: u64,
    },
    /// The coordinate lies outside the populated part of the log.
    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(String),
    /// Any failure of the underlying store.
    #[error("store fault: {0}")]
    StoreFault(#[from] treelog_storage::Error),
    /// Stored bytes are not a valid leaf encoding.
    #[error("decode fault: {0}")]
    DecodeFault(String),
    /// A leaf could not be encoded for storage.
    #[error("encode fault: {0}")]
    EncodeFault(String),
    /// The log configuration is unusable.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}
