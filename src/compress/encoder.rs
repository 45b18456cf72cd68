// Whole-buffer LZ77 encoder.
//
// Writes the 14-byte header (CRC32 of the whole input computed up front),
// then walks the input with a per-call MatchFinder:
//   - match of MIN_MATCH or more bytes -> match token, advance by its length
//   - otherwise                        -> literal (escaped if >= 0xBF), advance by 1
//
// Capacity is checked before every token. When the output fills up the
// encoder stops and reports what it wrote: a well-formed but truncated
// prefix that the decoder will reject.

use thiserror::Error;

use crate::checksum;
use crate::format::token::MAX_TOKEN_LEN;
use crate::format::{HEADER_SIZE, Header, OutputCursor, Token};
use crate::hash::compare::{Comparator, Lanes};
use crate::hash::config::{self, DEFAULT_WINDOW};
use crate::hash::matching::MatchFinder;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Encoder configuration.
#[derive(Debug, Clone)]
pub struct CompressOptions {
    /// Requested window in bytes. Values below 1 KiB (including 0) select
    /// the 65535-byte default; larger values are capped at 65535.
    pub window_size: usize,
    /// Force a comparator backend. `None` uses the widest one the CPU
    /// supports; an unsupported choice falls back to the same.
    pub lanes: Option<Lanes>,
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW,
            lanes: None,
        }
    }
}

impl CompressOptions {
    pub fn with_window(window_size: usize) -> Self {
        Self {
            window_size,
            ..Self::default()
        }
    }

    /// Window actually written to the header.
    pub fn effective_window(&self) -> usize {
        config::clamp_window(self.window_size)
    }

    fn comparator(&self) -> Comparator {
        match self.lanes {
            Some(lanes) => Comparator::with_lanes(lanes).unwrap_or_else(|| {
                log::warn!("comparator backend {lanes} not supported by this CPU, detecting");
                Comparator::detect()
            }),
            None => Comparator::detect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// The output cannot hold the header plus one byte per input byte.
    #[error("output buffer too small: need at least {needed} bytes, have {available}")]
    OutputTooSmall { needed: usize, available: usize },
    /// The input length does not fit the header's 32-bit size field.
    #[error("input of {len} bytes exceeds the 32-bit size field")]
    InputTooLarge { len: usize },
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Summary of one `compress_with_stats` call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodeStats {
    /// Input length.
    pub input_len: usize,
    /// Input bytes covered by emitted tokens.
    pub consumed: usize,
    /// Bytes written to the output, header included.
    pub written: usize,
    /// Window recorded in the header.
    pub window_size: usize,
    /// Match tokens emitted.
    pub matches: usize,
    /// Input bytes covered by match tokens.
    pub matched_bytes: usize,
    /// Literal tokens emitted (direct and escaped).
    pub literals: usize,
    /// Literal tokens that needed the escape byte.
    pub escaped: usize,
}

impl EncodeStats {
    /// True when the output filled up before the whole input was encoded.
    pub fn is_truncated(&self) -> bool {
        self.consumed < self.input_len
    }

    /// Compressed size over input size (0 for empty input).
    pub fn ratio(&self) -> f64 {
        if self.input_len == 0 {
            0.0
        } else {
            self.written as f64 / self.input_len as f64
        }
    }

    fn record(&mut self, token: &Token) {
        match *token {
            Token::Match { length, .. } => {
                self.matches += 1;
                self.matched_bytes += length as usize;
            }
            Token::Literal(_) => {
                self.literals += 1;
                if token.encoded_len() > 1 {
                    self.escaped += 1;
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Worst-case compressed size for `input_len` bytes: every byte an
/// escaped literal, plus the header.
pub fn max_compressed_len(input_len: usize) -> usize {
    input_len.saturating_mul(2).saturating_add(HEADER_SIZE)
}

/// Compress `input` into `output` and return the number of bytes written.
///
/// `window_size` is clamped as described on [`CompressOptions`]. A return
/// value smaller than a full encoding means the output filled up (see
/// [`compress_with_stats`] to detect that).
pub fn compress(input: &[u8], output: &mut [u8], window_size: usize) -> Result<usize, EncodeError> {
    compress_with_stats(input, output, &CompressOptions::with_window(window_size))
        .map(|stats| stats.written)
}

/// Compress `input` into `output`, returning detailed statistics.
pub fn compress_with_stats(
    input: &[u8],
    output: &mut [u8],
    opts: &CompressOptions,
) -> Result<EncodeStats, EncodeError> {
    let original_size =
        u32::try_from(input.len()).map_err(|_| EncodeError::InputTooLarge { len: input.len() })?;

    let needed = input.len() + HEADER_SIZE;
    if output.len() < needed {
        return Err(EncodeError::OutputTooSmall {
            needed,
            available: output.len(),
        });
    }

    // Tables live exactly as long as this call.
    let mut finder = MatchFinder::with_comparator(opts.window_size, opts.comparator());
    let window = finder.window();

    let header = Header {
        original_size,
        crc: checksum::crc32(input),
        window_size: window as u16,
    };

    let mut cursor = OutputCursor::new(output);
    cursor
        .write(&header.encode())
        .map_err(|_| EncodeError::OutputTooSmall {
            needed,
            available: cursor.capacity(),
        })?;

    let mut stats = EncodeStats {
        input_len: input.len(),
        window_size: window,
        ..EncodeStats::default()
    };

    encode_tokens(input, &mut finder, &mut cursor, &mut stats);
    stats.written = cursor.position();

    log::debug!(
        "compressed {} -> {} bytes (window {}, {} matches, {} literals, {} escaped, {})",
        stats.input_len,
        stats.written,
        stats.window_size,
        stats.matches,
        stats.literals,
        stats.escaped,
        finder.comparator().lanes().name(),
    );
    Ok(stats)
}

/// Compress into a freshly allocated buffer sized for the worst case.
///
/// The result is never truncated.
pub fn compress_to_vec(input: &[u8], opts: &CompressOptions) -> Result<Vec<u8>, EncodeError> {
    let mut out = vec![0u8; max_compressed_len(input.len())];
    let stats = compress_with_stats(input, &mut out, opts)?;
    debug_assert!(!stats.is_truncated());
    out.truncate(stats.written);
    Ok(out)
}

/// Compress independent buffers on the rayon pool.
///
/// Every job owns its own match-finder tables.
#[cfg(feature = "parallel")]
pub fn compress_batch(
    inputs: &[&[u8]],
    opts: &CompressOptions,
) -> Vec<Result<Vec<u8>, EncodeError>> {
    inputs
        .par_iter()
        .map(|input| compress_to_vec(input, opts))
        .collect()
}

// ---------------------------------------------------------------------------
// Token loop
// ---------------------------------------------------------------------------

fn encode_tokens(
    input: &[u8],
    finder: &mut MatchFinder,
    cursor: &mut OutputCursor<'_>,
    stats: &mut EncodeStats,
) {
    let end = input.len();
    let mut pos = 0usize;
    let mut scratch = [0u8; MAX_TOKEN_LEN];

    while pos < end {
        let (token, advance) = match finder.find_match(input, pos, end) {
            Some(m) => {
                let distance = m.distance(pos);
                debug_assert!(distance >= 1 && distance <= finder.window());
                let token = Token::Match {
                    distance: distance as u16,
                    length: m.length as u16,
                };
                (token, m.length)
            }
            None => (Token::Literal(input[pos]), 1),
        };

        if let Err(e) = cursor.write(token.encode(&mut scratch)) {
            log::warn!(
                "output full after {} of {} input bytes ({e}); stream is truncated",
                pos,
                end
            );
            break;
        }

        stats.record(&token);
        pos += advance;
    }

    stats.consumed = pos;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
