// Match finding for the LZ77 encoder.
//
// This module provides:
// - Tuning constants and window clamping
// - Lane-width-agnostic SIMD byte comparison
// - Head/chain index tables
// - The hash-chain longest-match search

pub mod compare;
pub mod config;
pub mod matching;
pub mod table;
