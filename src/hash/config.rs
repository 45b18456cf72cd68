// Match-finder tuning constants and window clamping.

/// Minimum match length worth a 4-byte match token.
pub const MIN_MATCH: usize = 3;

/// Maximum match length (length - MIN_MATCH must fit in one byte).
pub const MAX_MATCH: usize = 258;

/// Bits of the 3-byte prefix hash (head table has `1 << HASH_BITS` buckets).
pub const HASH_BITS: u32 = 14;

/// Number of head-table buckets.
pub const HASH_SIZE: usize = 1 << HASH_BITS;

/// Multiplier for the prefix hash (golden-ratio constant).
pub const HASH_MULT: u32 = 0x9E37_79B1;

/// Maximum chain candidates examined per position.
pub const MATCH_SEARCH_LIMIT: usize = 32;

/// Smallest accepted window (1 KiB).
pub const MIN_WINDOW: usize = 1 << 10;

/// Largest window: distances are encoded in 16 bits.
pub const MAX_WINDOW: usize = (1 << 16) - 1;

/// Window used when the requested one is too small (or 0).
pub const DEFAULT_WINDOW: usize = MAX_WINDOW;

/// Resolve a requested window size to the one actually used.
///
/// Below [`MIN_WINDOW`] (including 0, "use the default") the default is
/// used; anything above [`MAX_WINDOW`] is capped.
pub fn clamp_window(requested: usize) -> usize {
    if requested < MIN_WINDOW {
        DEFAULT_WINDOW
    } else {
        requested.min(MAX_WINDOW)
    }
}
