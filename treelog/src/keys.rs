//! Key layout of the log.
//!
//! - Root bucket (`log-root` by default): one empty marker per level created
//!   above level 0, keyed by the decimal height at creation time.
//! - Level bucket (`log-<level>` by default): one entry per node, keyed by
//!   the decimal index, holding the encoded [`crate::Leaf`].

/// Default name of the bucket holding level markers.
pub const DEFAULT_ROOT_BUCKET: &str = "log-root";

/// Default prefix of per-level buckets; the decimal level is appended.
pub const DEFAULT_LEVEL_BUCKET_PREFIX: &str = "log-";

/// Value stored under every level marker.
pub const LEVEL_MARKER: &[u8] = b"";

/// Bucket name for `level` under `prefix`.
pub fn level_bucket(prefix: &str, level: u64) -> Vec<u8> {
    format!("{prefix}{level}").into_bytes()
}

/// Key of the node at `index` within its level bucket, and of the marker
/// for the level whose ordinal is `index` in the root bucket.
pub fn index_key(index: u64) -> Vec<u8> {
    index.to_string().into_bytes()
}
