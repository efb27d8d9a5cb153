//! Block header data model and byte-exact encoding.
//!
//! The header layout is frozen: headers are hashed and persisted as raw
//! byte sequences, so any change to the field order, widths, or endianness
//! invalidates every previously computed digest.

use crate::crypto::{self, Sha256Hash, ZERO_HASH};
use serde::{Deserialize, Serialize};

/// Size of an encoded header in bytes: 4 + 32 + 32 + 4 + 4.
pub const HEADER_SIZE: usize = 76;

/// A fixed-layout block header. Integers encode little-endian.
///
/// A header goes through two phases: [`BlockHeader::bind`] fixes the content
/// and linkage fields, then the miner overwrites `timestamp` and `nonce`
/// until the header's own digest falls below the target. Once mined, a
/// header is immutable and becomes the predecessor of the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    /// Byte length of the payload this block commits to.
    pub contents_length: u32,
    /// Digest of the payload bytes.
    pub contents_hash: Sha256Hash,
    /// Digest of the entire previous header's bytes, or all-zero for genesis.
    pub previous_hash: Sha256Hash,
    /// Seconds since epoch when the current mining round began.
    pub timestamp: u32,
    /// Adjusted by the miner until the header digest meets the target.
    pub nonce: u32,
}

impl BlockHeader {
    /// Binding phase: commit to the payload and the predecessor.
    ///
    /// The payload is hashed verbatim, exactly the bytes supplied; no
    /// terminator or sentinel is appended, and `contents_length` is the
    /// exact payload byte count used for the digest. `timestamp` and
    /// `nonce` start at zero and only become meaningful once mined.
    ///
    /// Callers are expected to have length-checked the payload already
    /// ([`crate::chain::ChainBuilder`] enforces the configured cap).
    pub fn bind(previous: Option<&BlockHeader>, payload: &[u8]) -> Self {
        BlockHeader {
            contents_length: payload.len() as u32,
            contents_hash: crypto::digest(payload),
            previous_hash: Self::bind_previous(previous),
            timestamp: 0,
            nonce: 0,
        }
    }

    /// Digest of the predecessor's full encoded bytes, including its
    /// finalized nonce and timestamp. All-zero when there is no predecessor.
    pub fn bind_previous(previous: Option<&BlockHeader>) -> Sha256Hash {
        match previous {
            Some(header) => header.hash(),
            None => ZERO_HASH,
        }
    }

    /// Serialize to the frozen 76-byte layout.
    ///
    /// The encoding is an explicit field-by-field copy, never a struct
    /// memory dump, so the hashed representation contains no padding and is
    /// identical across platforms.
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0..4].copy_from_slice(&self.contents_length.to_le_bytes());
        bytes[4..36].copy_from_slice(&self.contents_hash);
        bytes[36..68].copy_from_slice(&self.previous_hash);
        bytes[68..72].copy_from_slice(&self.timestamp.to_le_bytes());
        bytes[72..76].copy_from_slice(&self.nonce.to_le_bytes());
        bytes
    }

    /// Rebuild a header from its encoded record. Inverse of [`encode`].
    ///
    /// [`encode`]: BlockHeader::encode
    pub fn decode(bytes: &[u8; HEADER_SIZE]) -> Self {
        let mut contents_hash = ZERO_HASH;
        contents_hash.copy_from_slice(&bytes[4..36]);
        let mut previous_hash = ZERO_HASH;
        previous_hash.copy_from_slice(&bytes[36..68]);

        // The slices are fixed-width, so the conversions cannot fail.
        let word = |range: std::ops::Range<usize>| {
            let mut buf = [0u8; 4];
            buf.copy_from_slice(&bytes[range]);
            u32::from_le_bytes(buf)
        };

        BlockHeader {
            contents_length: word(0..4),
            contents_hash,
            previous_hash,
            timestamp: word(68..72),
            nonce: word(72..76),
        }
    }

    /// Digest of the full encoded header, nonce and timestamp included.
    pub fn hash(&self) -> Sha256Hash {
        crypto::digest(&self.encode())
    }

    /// True for the chain's first header, which has no predecessor.
    pub fn is_genesis(&self) -> bool {
        self.previous_hash == ZERO_HASH
    }
}
