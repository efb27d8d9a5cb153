//! Chain orchestration: bind, mine, and link one header at a time.

use crate::crypto::Sha256Hash;
use crate::error::{ChainError, Result};
use crate::header::BlockHeader;
use crate::miner::{mine_block, CancelToken, MiningConfig};
use tracing::debug;

/// Default cap on an accepted payload, in bytes. Oversized payloads are
/// rejected outright, never truncated.
pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 4096;

/// A finalized header together with its own digest, ready for display or
/// persistence by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinedBlock {
    pub header: BlockHeader,
    pub hash: Sha256Hash,
}

/// Builds the chain one block at a time.
///
/// The chain is an implicit singly-linked sequence: each header's
/// `previous_hash` is the only link, so only the most recently mined header
/// is retained. Construction is strictly sequential; the next block's
/// `previous_hash` is defined only once the current one is fully mined.
pub struct ChainBuilder {
    config: MiningConfig,
    cancel: CancelToken,
    max_payload_bytes: usize,
    tip: Option<BlockHeader>,
    height: u64,
}

impl ChainBuilder {
    pub fn new(config: MiningConfig) -> Self {
        ChainBuilder {
            config,
            cancel: CancelToken::new(),
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
            tip: None,
            height: 0,
        }
    }

    pub fn with_max_payload_bytes(mut self, max_payload_bytes: usize) -> Self {
        self.max_payload_bytes = max_payload_bytes;
        self
    }

    /// Handle for cancelling an in-flight [`append`] from another thread,
    /// e.g. on shutdown. A cancelled append leaves the tip untouched.
    ///
    /// [`append`]: ChainBuilder::append
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// The most recently mined header, if any.
    pub fn tip(&self) -> Option<&BlockHeader> {
        self.tip.as_ref()
    }

    /// Number of blocks mined so far.
    pub fn height(&self) -> u64 {
        self.height
    }

    /// Bind a payload into a new header, mine it, and adopt it as the tip.
    ///
    /// The first call builds the genesis block: with no predecessor, the
    /// header gets an all-zero `previous_hash` and is otherwise built
    /// identically to any other block. Blocks the calling thread for the
    /// duration of the mining search.
    pub fn append(&mut self, payload: &[u8]) -> Result<MinedBlock> {
        if payload.len() > self.max_payload_bytes {
            return Err(ChainError::InputError(format!(
                "payload is {} bytes, maximum accepted is {}",
                payload.len(),
                self.max_payload_bytes
            )));
        }

        let bound = BlockHeader::bind(self.tip.as_ref(), payload);
        let header = mine_block(bound, &self.config, &self.cancel)?;
        let hash = header.hash();
        debug!(
            height = self.height,
            nonce = header.nonce,
            "mined block"
        );

        self.tip = Some(header);
        self.height += 1;
        Ok(MinedBlock { header, hash })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{self, HASH_SIZE, ZERO_HASH};

    fn easy_config() -> MiningConfig {
        MiningConfig::new([0xffu8; HASH_SIZE])
    }

    #[test]
    fn test_genesis_previous_hash_is_zero() {
        for payload in [&b""[..], b"a", b"a much longer genesis payload"] {
            let mut chain = ChainBuilder::new(easy_config());
            let mined = chain.append(payload).unwrap();
            assert_eq!(mined.header.previous_hash, ZERO_HASH);
            assert!(mined.header.is_genesis());
        }
    }

    #[test]
    fn test_chaining_integrity() {
        let mut chain = ChainBuilder::new(easy_config());
        let first = chain.append(b"one").unwrap();
        let second = chain.append(b"two").unwrap();
        let third = chain.append(b"three").unwrap();

        // Each link is the digest of the predecessor's finalized bytes,
        // nonce and timestamp included.
        assert_eq!(second.header.previous_hash, first.header.hash());
        assert_eq!(third.header.previous_hash, second.header.hash());
        assert_eq!(chain.height(), 3);
        assert_eq!(chain.tip(), Some(&third.header));
    }

    #[test]
    fn test_mined_hash_matches_header() {
        let mut chain = ChainBuilder::new(easy_config());
        let mined = chain.append(b"payload").unwrap();
        assert_eq!(mined.hash, mined.header.hash());
        assert!(crypto::meets_target(&mined.hash, &[0xffu8; HASH_SIZE]));
    }

    #[test]
    fn test_oversized_payload_rejected() {
        let mut chain = ChainBuilder::new(easy_config()).with_max_payload_bytes(8);
        let result = chain.append(b"nine bytes");
        assert!(matches!(result, Err(ChainError::InputError(_))));

        // The rejection leaves the chain untouched and usable.
        assert_eq!(chain.height(), 0);
        assert!(chain.tip().is_none());
        assert!(chain.append(b"ok").is_ok());
    }

    #[test]
    fn test_payload_at_cap_accepted() {
        let mut chain = ChainBuilder::new(easy_config()).with_max_payload_bytes(8);
        let mined = chain.append(b"8 bytes!").unwrap();
        assert_eq!(mined.header.contents_length, 8);
    }

    #[test]
    fn test_cancelled_append_discards_partial_header() {
        // Nothing can fall below an all-zero target, so only cancellation
        // can end this append.
        let mut chain = ChainBuilder::new(MiningConfig::new(ZERO_HASH));
        chain.cancel_token().cancel();
        let result = chain.append(b"doomed");
        assert!(matches!(result, Err(ChainError::Cancelled)));
        assert!(chain.tip().is_none());
        assert_eq!(chain.height(), 0);
    }

    #[test]
    fn test_content_binding_per_block() {
        let mut chain = ChainBuilder::new(easy_config());
        let payloads: [&[u8]; 3] = [b"alpha", b"beta", b"gamma"];
        for payload in payloads {
            let mined = chain.append(payload).unwrap();
            assert_eq!(mined.header.contents_hash, crypto::digest(payload));
            assert_eq!(mined.header.contents_length, payload.len() as u32);
        }
    }
}
