//! Cryptographic primitives for ferrochain

use crate::error::ChainError;
use sha2::{Digest, Sha256};

/// Number of bytes in a SHA-256 digest.
pub const HASH_SIZE: usize = 32;

/// Type alias for a 32-byte SHA-256 digest.
/// We use a fixed-size array for internal type safety and performance.
pub type Sha256Hash = [u8; HASH_SIZE];

/// The all-zero digest, used as the previous-hash of a genesis header.
pub const ZERO_HASH: Sha256Hash = [0u8; HASH_SIZE];

/// Digest an arbitrary byte sequence. Every hash in the chain goes through
/// this single entry point so the primitive can be swapped in one place.
pub fn digest(bytes: &[u8]) -> Sha256Hash {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher.finalize().into()
}

/// True iff `hash < target` when both are read as 256-bit big-endian
/// unsigned integers.
///
/// `[u8; 32]` orders lexicographically from the most significant byte, which
/// is exactly the big-endian unsigned order; a leading byte with its high
/// bit set compares as a large value, never a negative one. The comparison
/// is strict: a digest equal to the target does not qualify.
pub fn meets_target(hash: &Sha256Hash, target: &Sha256Hash) -> bool {
    hash < target
}

/// Render a digest for display: `0x` followed by 64 lowercase hex chars.
pub fn hash_to_hex(hash: &Sha256Hash) -> String {
    format!("0x{}", hex::encode(hash))
}

/// Parse a 32-byte value from hex. An optional `0x` prefix is accepted.
pub fn hash_from_hex(hex_str: &str) -> Result<Sha256Hash, ChainError> {
    let hex_str = hex_str.strip_prefix("0x").unwrap_or(hex_str);
    let bytes = hex::decode(hex_str)
        .map_err(|e| ChainError::CryptoError(format!("Invalid hex value: {}", e)))?;
    if bytes.len() != HASH_SIZE {
        return Err(ChainError::CryptoError(format!(
            "Hash must be {} bytes, got {}",
            HASH_SIZE,
            bytes.len()
        )));
    }
    bytes
        .try_into()
        .map_err(|_| ChainError::CryptoError("Failed to convert bytes into hash".to_string()))
}
