// Head/chain index tables for the match finder.
//
//   - `head[hash]`: most recent position whose 3-byte prefix hashed to
//     `hash`. Zero-initialized, so 0 means both "empty" and "position 0".
//   - `chain[pos % window]`: previous position in the same bucket as `pos`.
//     Positions congruent modulo the window share a slot; the newer one
//     wins, which can cut a chain short but never yields a wrong match
//     because every candidate is byte-verified.

use super::config::{HASH_BITS, HASH_MULT, HASH_SIZE, MIN_MATCH};

/// Hash of the 3 bytes at the start of `bytes`, folded to `HASH_BITS` bits.
///
/// Callers guarantee `bytes.len() >= MIN_MATCH`.
#[inline(always)]
pub fn prefix_hash(bytes: &[u8]) -> usize {
    debug_assert!(bytes.len() >= MIN_MATCH);
    let v = ((bytes[0] as u32) << 16) | ((bytes[1] as u32) << 8) | bytes[2] as u32;
    (v.wrapping_mul(HASH_MULT) >> (32 - HASH_BITS)) as usize
}

/// Match-finder state owned by a single compression call.
pub struct ChainTable {
    head: Vec<u32>,
    chain: Vec<u32>,
    window: usize,
}

impl ChainTable {
    /// Allocate zeroed tables for an already-clamped `window`.
    pub fn new(window: usize) -> Self {
        debug_assert!(window > 0);
        Self {
            head: vec![0u32; HASH_SIZE],
            chain: vec![0u32; window],
            window,
        }
    }

    /// Window size the chain table is sized for.
    pub fn window(&self) -> usize {
        self.window
    }

    /// Record `pos` as the newest entry of bucket `hash` and return the
    /// bucket's previous head (0 if the bucket was never written).
    #[inline(always)]
    pub fn replace_head(&mut self, hash: usize, pos: u32) -> u32 {
        std::mem::replace(&mut self.head[hash], pos)
    }

    /// Previous position linked from `pos`.
    #[inline(always)]
    pub fn prev(&self, pos: u32) -> u32 {
        self.chain[pos as usize % self.window]
    }

    /// Link `pos` to `prior` in the chain.
    #[inline(always)]
    pub fn link(&mut self, pos: u32, prior: u32) {
        self.chain[pos as usize % self.window] = prior;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
