//! Proof-of-work nonce search.
//!
//! A mining round fixes the header timestamp to the current wall clock and
//! sweeps the u32 nonce range; exhausting the range is not an error, it
//! starts the next round with a fresh timestamp. The search blocks the
//! calling thread until a solution is found or the caller cancels.

use crate::crypto::{self, Sha256Hash};
use crate::error::{ChainError, Result};
use crate::header::BlockHeader;
use crossbeam_channel::bounded;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use tracing::debug;

/// Nonces tried between cancellation checks inside the hot loop.
const CANCEL_CHECK_MASK: u32 = 0x0fff;

/// Mining parameters. The target is a first-class configuration input,
/// never a global: smaller leading bytes make the search exponentially
/// harder (a digest qualifies with probability ~= target / 2^256).
#[derive(Debug, Clone)]
pub struct MiningConfig {
    /// 32-byte threshold a header digest must fall strictly below.
    pub target: Sha256Hash,
    /// Worker threads for the nonce search. 1 means sequential.
    pub threads: usize,
}

impl MiningConfig {
    pub fn new(target: Sha256Hash) -> Self {
        MiningConfig { target, threads: 1 }
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }
}

/// Cooperative cancellation flag shared between the caller and the nonce
/// search. Cloning yields a handle to the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Search for a timestamp/nonce pair whose header digest falls below the
/// target, returning the finalized header.
///
/// The binding fields of `header` are left untouched; only `timestamp` and
/// `nonce` are overwritten. There is no termination bound beyond
/// cancellation: the loop runs until some round produces a qualifying
/// digest, which in practice happens well within one round for any
/// reasonably loose target. A cancelled search returns
/// [`ChainError::Cancelled`] and publishes nothing.
pub fn mine_block(
    header: BlockHeader,
    config: &MiningConfig,
    cancel: &CancelToken,
) -> Result<BlockHeader> {
    if config.threads > 1 {
        mine_parallel(header, config, cancel)
    } else {
        mine_sequential(header, config, cancel)
    }
}

fn round_timestamp() -> u32 {
    chrono::Utc::now().timestamp() as u32
}

fn mine_sequential(
    mut header: BlockHeader,
    config: &MiningConfig,
    cancel: &CancelToken,
) -> Result<BlockHeader> {
    loop {
        // Start of the mining round: fix the timestamp, sweep the nonce.
        header.timestamp = round_timestamp();

        let mut nonce: u32 = 0;
        loop {
            header.nonce = nonce;
            if crypto::meets_target(&header.hash(), &config.target) {
                return Ok(header);
            }
            if nonce & CANCEL_CHECK_MASK == 0 && cancel.is_cancelled() {
                return Err(ChainError::Cancelled);
            }
            if nonce == u32::MAX {
                break;
            }
            nonce += 1;
        }

        debug!("nonce range exhausted, starting a new round");
    }
}

/// Strided variant: each round splits the nonce range into disjoint
/// contiguous chunks, one per worker. Workers share the immutable binding
/// fields and the round timestamp; the first to find a qualifying nonce
/// raises a shared stop flag and the others wind down cooperatively.
fn mine_parallel(
    header: BlockHeader,
    config: &MiningConfig,
    cancel: &CancelToken,
) -> Result<BlockHeader> {
    let threads = config.threads;
    let target = config.target;

    loop {
        let mut round = header;
        round.timestamp = round_timestamp();

        let stop = AtomicBool::new(false);
        let (found_tx, found_rx) = bounded::<BlockHeader>(threads);

        thread::scope(|scope| {
            let chunk = (u64::from(u32::MAX) + 1) / threads as u64;
            for worker in 0..threads {
                let start = (worker as u64 * chunk) as u32;
                let end = if worker + 1 == threads {
                    u32::MAX
                } else {
                    ((worker as u64 + 1) * chunk - 1) as u32
                };
                let stop = &stop;
                let found_tx = found_tx.clone();
                scope.spawn(move || {
                    let mut candidate = round;
                    let mut nonce = start;
                    loop {
                        candidate.nonce = nonce;
                        if crypto::meets_target(&candidate.hash(), &target) {
                            stop.store(true, Ordering::Relaxed);
                            // The channel holds one slot per worker, so this
                            // cannot block even if several race to a solution.
                            let _ = found_tx.try_send(candidate);
                            return;
                        }
                        if nonce & CANCEL_CHECK_MASK == 0
                            && (stop.load(Ordering::Relaxed) || cancel.is_cancelled())
                        {
                            return;
                        }
                        if nonce == end {
                            return;
                        }
                        nonce += 1;
                    }
                });
            }
        });

        drop(found_tx);
        if let Ok(winner) = found_rx.try_recv() {
            return Ok(winner);
        }
        if cancel.is_cancelled() {
            return Err(ChainError::Cancelled);
        }

        debug!(
            "nonce range exhausted across {} workers, starting a new round",
            threads
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{HASH_SIZE, ZERO_HASH};

    /// Loose enough that the very first nonces qualify.
    fn easy_target() -> Sha256Hash {
        [0xffu8; HASH_SIZE]
    }

    /// Strictly nothing qualifies: no digest is below zero.
    fn impossible_target() -> Sha256Hash {
        ZERO_HASH
    }

    #[test]
    fn test_mine_meets_target() {
        let bound = BlockHeader::bind(None, b"mine me");
        let config = MiningConfig::new(easy_target());
        let mined = mine_block(bound, &config, &CancelToken::new()).unwrap();
        assert!(crypto::meets_target(&mined.hash(), &config.target));
    }

    #[test]
    fn test_mine_preserves_binding_fields() {
        let bound = BlockHeader::bind(None, b"mine me");
        let config = MiningConfig::new(easy_target());
        let mined = mine_block(bound, &config, &CancelToken::new()).unwrap();
        assert_eq!(mined.contents_length, bound.contents_length);
        assert_eq!(mined.contents_hash, bound.contents_hash);
        assert_eq!(mined.previous_hash, bound.previous_hash);
    }

    #[test]
    fn test_mine_nontrivial_target() {
        // One zero leading byte: ~256 attempts expected, still instant.
        let mut target = ZERO_HASH;
        target[1] = 0x10;
        let bound = BlockHeader::bind(None, b"a harder block");
        let config = MiningConfig::new(target);
        let mined = mine_block(bound, &config, &CancelToken::new()).unwrap();
        let hash = mined.hash();
        assert_eq!(hash[0], 0);
        assert!(crypto::meets_target(&hash, &target));
    }

    #[test]
    fn test_cancelled_before_start() {
        let bound = BlockHeader::bind(None, b"never mined");
        let config = MiningConfig::new(impossible_target());
        let cancel = CancelToken::new();
        cancel.cancel();
        let result = mine_block(bound, &config, &cancel);
        assert!(matches!(result, Err(ChainError::Cancelled)));
    }

    #[test]
    fn test_cancelled_parallel() {
        let bound = BlockHeader::bind(None, b"never mined");
        let config = MiningConfig::new(impossible_target()).with_threads(2);
        let cancel = CancelToken::new();
        cancel.cancel();
        let result = mine_block(bound, &config, &cancel);
        assert!(matches!(result, Err(ChainError::Cancelled)));
    }

    #[test]
    fn test_mine_parallel_meets_target() {
        let mut target = ZERO_HASH;
        target[1] = 0x10;
        let bound = BlockHeader::bind(None, b"parallel block");
        let config = MiningConfig::new(target).with_threads(4);
        let mined = mine_block(bound, &config, &CancelToken::new()).unwrap();
        assert!(crypto::meets_target(&mined.hash(), &target));
        assert_eq!(mined.contents_hash, bound.contents_hash);
        assert_eq!(mined.previous_hash, bound.previous_hash);
    }

    #[test]
    fn test_rejection_is_deterministic() {
        // A header known to miss the target keeps missing it on replay.
        let bound = BlockHeader::bind(None, b"replayed");
        let target = bound.hash();
        for _ in 0..3 {
            assert!(!crypto::meets_target(&bound.hash(), &target));
        }
    }

    #[test]
    fn test_cancel_token_is_shared() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }
}
