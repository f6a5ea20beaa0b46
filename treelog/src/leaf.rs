//! The node payload stored at every coordinate of the log.
//!
//! Wire format: `version(1) || bincode(Leaf)` using the bincode standard
//! configuration with big-endian integers. The encoding is deterministic, so
//! the same leaf always produces the same stored bytes.

use bincode::{Decode, Encode};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::Error;

/// Version byte written in front of every encoded leaf.
pub const LEAF_VERSION: u8 = 0;

/// Largest payload the codec accepts: 16 MiB.
pub const DEFAULT_MAX_LEAF_SIZE: usize = 16 * 1024 * 1024;

/// Bincode limit on decode; covers the payload plus its length prefix so a
/// crafted header cannot force a larger allocation.
const DECODE_LIMIT: usize = DEFAULT_MAX_LEAF_SIZE + 16;

/// An opaque node of the log.
///
/// Level 0 nodes are the appended records; higher levels hold whatever the
/// hashing layer derives from them. The engine never looks inside.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Encode, Decode)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Leaf {
    payload: Vec<u8>,
}

impl Leaf {
    /// Wrap `payload` in a leaf.
    pub fn new(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            payload: payload.into(),
        }
    }

    /// The raw payload.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Consume the leaf and return its payload.
    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }

    /// Exact length of [`Leaf::encode`]'s output.
    ///
    /// The payload length is a bincode varint: one byte below 251, then a
    /// marker byte followed by a u16, u32 or u64.
    pub fn encoded_size(&self) -> usize {
        let len = self.payload.len();
        let prefix = match len as u64 {
            0..=250 => 1,
            251..=0xFFFF => 3,
            0x1_0000..=0xFFFF_FFFF => 5,
            _ => 9,
        };
        1 + prefix + len
    }

    /// Encode the leaf for storage.
    pub fn encode(&self) -> Result<Vec<u8>, Error> {
        let config = bincode::config::standard()
            .with_big_endian()
            .with_no_limit();
        let mut bytes = Vec::with_capacity(self.encoded_size());
        bytes.push(LEAF_VERSION);
        let body = bincode::encode_to_vec(self, config)
            .map_err(|e| Error::EncodeFault(format!("failed to encode leaf: {}", e)))?;
        bytes.extend_from_slice(&body);
        Ok(bytes)
    }

    /// Decode a stored leaf, accepting payloads up to
    /// [`DEFAULT_MAX_LEAF_SIZE`].
    pub fn decode(bytes: &[u8]) -> Result<Self, Error> {
        Self::decode_with_limit(bytes, DEFAULT_MAX_LEAF_SIZE)
    }

    /// Decode a stored leaf, rejecting payloads above `max_leaf_size`.
    pub fn decode_with_limit(bytes: &[u8], max_leaf_size: usize) -> Result<Self, Error> {
        let (version, body) = bytes
            .split_first()
            .ok_or_else(|| Error::DecodeFault("empty leaf encoding".to_string()))?;
        if *version != LEAF_VERSION {
            return Err(Error::DecodeFault(format!(
                "unknown leaf version {}",
                version
            )));
        }
        let config = bincode::config::standard()
            .with_big_endian()
            .with_limit::<DECODE_LIMIT>();
        let (leaf, read): (Self, usize) = bincode::decode_from_slice(body, config)
            .map_err(|e| Error::DecodeFault(format!("failed to decode leaf: {}", e)))?;
        if read != body.len() {
            return Err(Error::DecodeFault(format!(
                "{} trailing bytes after leaf",
                body.len() - read
            )));
        }
        if leaf.payload.len() > max_leaf_size {
            return Err(Error::DecodeFault(format!(
                "leaf payload of {} bytes exceeds limit of {}",
                leaf.payload.len(),
                max_leaf_size
            )));
        }
        Ok(leaf)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn test_encode_layout() {
        let bytes = Leaf::new(b"abc".to_vec()).encode().expect("encode");
        assert_eq!(bytes, vec![LEAF_VERSION, 3, b'a', b'b', b'c']);
    }

    #[test]
    fn test_encode_is_deterministic() {
        let leaf = Leaf::new(vec![7u8; 300]);
        assert_eq!(
            leaf.encode().expect("encode"),
            leaf.clone().encode().expect("encode")
        );
    }

    #[test]
    fn test_encoded_size_matches_encoding() {
        for len in [0usize, 1, 250, 251, 65_535, 65_536, 70_000] {
            let leaf = Leaf::new(vec![0xAB; len]);
            assert_eq!(
                leaf.encoded_size(),
                leaf.encode().expect("encode").len(),
                "payload length {}",
                len
            );
        }
    }

    #[test]
    fn test_decode_rejects_empty_buffer() {
        assert_matches!(Leaf::decode(&[]), Err(Error::DecodeFault(_)));
    }

    #[test]
    fn test_decode_rejects_unknown_version() {
        let mut bytes = Leaf::new(b"x".to_vec()).encode().expect("encode");
        bytes[0] = LEAF_VERSION + 1;
        assert_matches!(Leaf::decode(&bytes), Err(Error::DecodeFault(_)));
    }

    #[test]
    fn test_decode_rejects_truncated_and_trailing() {
        let bytes = Leaf::new(b"hello".to_vec()).encode().expect("encode");
        assert_matches!(
            Leaf::decode(&bytes[..bytes.len() - 1]),
            Err(Error::DecodeFault(_))
        );

        let mut padded = bytes.clone();
        padded.push(0);
        assert_matches!(Leaf::decode(&padded), Err(Error::DecodeFault(_)));
    }

    #[test]
    fn test_decode_enforces_limit() {
        let bytes = Leaf::new(vec![1u8; 64]).encode().expect("encode");
        assert_matches!(
            Leaf::decode_with_limit(&bytes, 63),
            Err(Error::DecodeFault(_))
        );
        let leaf = Leaf::decode_with_limit(&bytes, 64).expect("within limit");
        assert_eq!(leaf.payload().len(), 64);
    }

    #[test]
    fn test_accessors() {
        let leaf = Leaf::new("payload");
        assert_eq!(leaf.payload(), b"payload");
        assert_eq!(leaf.into_payload(), b"payload".to_vec());
    }
}
