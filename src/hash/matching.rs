// Hash-chain longest-match search.
//
// For each position the 3-byte prefix hash selects a bucket; the bucket's
// previous head and its chain are walked (at most MATCH_SEARCH_LIMIT
// candidates, never further back than the window) and each candidate is
// compared forward with the vector comparator.

use super::compare::Comparator;
use super::config::{self, MATCH_SEARCH_LIMIT, MAX_MATCH, MIN_MATCH};
use super::table::{self, ChainTable};

// ---------------------------------------------------------------------------
// Match result
// ---------------------------------------------------------------------------

/// Longest earlier occurrence found for a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    /// Start of the earlier occurrence.
    pub position: usize,
    /// Match length, in `MIN_MATCH..=MAX_MATCH`.
    pub length: usize,
}

impl Match {
    /// Backward distance from `pos` to the matched bytes.
    #[inline]
    pub fn distance(&self, pos: usize) -> usize {
        pos - self.position
    }
}

// ---------------------------------------------------------------------------
// Match finder
// ---------------------------------------------------------------------------

/// Match finder owning the head/chain tables of one compression session.
pub struct MatchFinder {
    table: ChainTable,
    comparator: Comparator,
}

impl MatchFinder {
    /// Create a finder for `requested_window` (clamped, see
    /// [`config::clamp_window`]) using the detected comparator.
    pub fn new(requested_window: usize) -> Self {
        Self::with_comparator(requested_window, Comparator::detect())
    }

    /// Create a finder bound to a specific comparator backend.
    pub fn with_comparator(requested_window: usize, comparator: Comparator) -> Self {
        let window = config::clamp_window(requested_window);
        Self {
            table: ChainTable::new(window),
            comparator,
        }
    }

    /// Effective window size.
    pub fn window(&self) -> usize {
        self.table.window()
    }

    pub fn comparator(&self) -> Comparator {
        self.comparator
    }

    /// Find the longest match for `data[pos..end]` among earlier positions.
    ///
    /// Returns `None` without touching the tables when fewer than
    /// `MIN_MATCH` bytes remain. Otherwise `pos` is always recorded in the
    /// tables, whether or not a match is found.
    ///
    /// Position 0 is never offered as a candidate: a zero head or chain
    /// entry terminates the walk.
    pub fn find_match(&mut self, data: &[u8], pos: usize, end: usize) -> Option<Match> {
        debug_assert!(end <= data.len());
        if pos + MIN_MATCH > end {
            return None;
        }

        let hash = table::prefix_hash(&data[pos..end]);
        let pos32 = pos as u32;
        let prior = self.table.replace_head(hash, pos32);

        let window = self.table.window();
        let max_len = (end - pos).min(MAX_MATCH);
        let current = &data[pos..end];

        let mut best: Option<Match> = None;
        let mut candidate = prior;

        for _ in 0..MATCH_SEARCH_LIMIT {
            if candidate == 0 {
                break;
            }
            if candidate == pos32 {
                candidate = self.table.prev(candidate);
                continue;
            }

            let cand = candidate as usize;
            // Chain entries only get older; once out of the window, stop.
            match pos.checked_sub(cand) {
                Some(distance) if distance <= window => {}
                _ => break,
            }

            let len = self.comparator.compare(current, &data[cand..end], max_len);
            if len >= MIN_MATCH && best.is_none_or(|b| len > b.length) {
                best = Some(Match {
                    position: cand,
                    length: len,
                });
                if len >= MAX_MATCH {
                    break;
                }
            }

            candidate = self.table.prev(candidate);
        }

        self.table.link(pos32, prior);
        best
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
