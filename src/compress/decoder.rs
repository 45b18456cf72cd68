// Whole-buffer LZ77 decoder.
//
// Parses the header, replays tokens into the caller's buffer and then
// checks the declared size and CRC32. Every token is validated against
// the output produced so far before anything is copied:
//   - distance must be in 1..=min(position, window)
//   - position + length must not pass the declared size
//
// Match copies go byte by byte, front to back, so a distance shorter than
// the length repeats the most recent bytes (run-length behaviour).

use thiserror::Error;

use crate::checksum;
use crate::format::token::MATCH_TOKEN_LEN;
use crate::format::{HEADER_SIZE, Header, Token, Tokens};
use crate::hash::config::MAX_MATCH;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("input too short for a header: {len} bytes")]
    TooShort { len: usize },

    #[error("bad magic: {found:#010X}")]
    BadMagic { found: u32 },

    #[error("invalid window size {window}")]
    InvalidWindow { window: u16 },

    #[error("output buffer too small: need {needed} bytes, have {available}")]
    OutputTooSmall { needed: usize, available: usize },

    #[error("truncated token at offset {offset}: need {needed} bytes, {available} available")]
    TruncatedToken {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("invalid match distance {distance} at output position {position} (window {window})")]
    InvalidDistance {
        distance: usize,
        position: usize,
        window: usize,
    },

    #[error("match of {length} bytes at output position {position} overruns declared size {size}")]
    MatchOverrun {
        position: usize,
        length: usize,
        size: usize,
    },

    #[error("size mismatch: header declares {expected} bytes, stream produced {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("checksum mismatch: expected {expected:#010X}, got {actual:#010X}")]
    ChecksumMismatch { expected: u32, actual: u32 },

    #[error("declared size {declared} exceeds the {limit} bytes the payload can produce")]
    ImplausibleSize { declared: usize, limit: usize },
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Most bytes a payload of `payload_len` bytes can decode to: as many
/// maximal matches as fit, the remainder as direct literals.
pub fn max_decompressed_len(payload_len: usize) -> usize {
    (payload_len / MATCH_TOKEN_LEN)
        .saturating_mul(MAX_MATCH)
        .saturating_add(payload_len % MATCH_TOKEN_LEN)
}

/// Decompress `input` into `output`, returning the original size.
///
/// Bytes after the point where the declared size is reached are ignored.
/// On error the contents of `output` are unspecified.
pub fn decompress(input: &[u8], output: &mut [u8]) -> Result<usize, DecodeError> {
    let header = Header::parse(input)?;
    decode_into(&header, input, output)
}

/// Decompress into a freshly allocated buffer of the declared size.
///
/// The declared size is checked against what the payload could possibly
/// produce before anything is allocated.
pub fn decompress_to_vec(input: &[u8]) -> Result<Vec<u8>, DecodeError> {
    decompress_with_header(input).map(|(_, out)| out)
}

/// Like [`decompress_to_vec`], also returning the parsed header.
pub fn decompress_with_header(input: &[u8]) -> Result<(Header, Vec<u8>), DecodeError> {
    let header = Header::parse(input)?;
    let declared = header.original_size as usize;
    let limit = max_decompressed_len(input.len() - HEADER_SIZE);
    if declared > limit {
        return Err(DecodeError::ImplausibleSize { declared, limit });
    }

    let mut out = vec![0u8; declared];
    let n = decode_into(&header, input, &mut out)?;
    debug_assert_eq!(n, declared);
    Ok((header, out))
}

/// Replay the payload after an already parsed `header` and verify it.
fn decode_into(header: &Header, input: &[u8], output: &mut [u8]) -> Result<usize, DecodeError> {
    let size = header.original_size as usize;
    if size > output.len() {
        return Err(DecodeError::OutputTooSmall {
            needed: size,
            available: output.len(),
        });
    }

    let out = &mut output[..size];
    let mut tokens = Tokens::new(&input[HEADER_SIZE..]);
    let produced = replay(&mut tokens, out, header.window_size as usize)?;

    if produced != size {
        return Err(DecodeError::SizeMismatch {
            expected: size,
            actual: produced,
        });
    }

    let actual = checksum::crc32(out);
    if actual != header.crc {
        return Err(DecodeError::ChecksumMismatch {
            expected: header.crc,
            actual,
        });
    }

    let trailing = input.len() - HEADER_SIZE - tokens.consumed();
    if trailing > 0 {
        log::debug!("ignoring {trailing} trailing bytes after the stream");
    }
    log::debug!(
        "decompressed {} -> {} bytes (window {})",
        input.len(),
        size,
        header.window_size
    );
    Ok(size)
}

// ---------------------------------------------------------------------------
// Token replay
// ---------------------------------------------------------------------------

/// Replay tokens into `out` until it is full or the payload runs out.
/// Returns the number of bytes produced.
fn replay(tokens: &mut Tokens<'_>, out: &mut [u8], window: usize) -> Result<usize, DecodeError> {
    let size = out.len();
    let mut pos = 0usize;

    while pos < size {
        let Some(token) = tokens.next() else {
            break;
        };

        match token? {
            Token::Literal(b) => {
                out[pos] = b;
                pos += 1;
            }
            Token::Match { distance, length } => {
                let distance = distance as usize;
                let length = length as usize;

                if distance == 0 || distance > pos || distance > window {
                    return Err(DecodeError::InvalidDistance {
                        distance,
                        position: pos,
                        window,
                    });
                }
                if length > size - pos {
                    return Err(DecodeError::MatchOverrun {
                        position: pos,
                        length,
                        size,
                    });
                }

                // Source and destination may overlap; copy forward one byte at a time.
                let start = pos - distance;
                for i in 0..length {
                    out[pos + i] = out[start + i];
                }
                pos += length;
            }
        }
    }

    Ok(pos)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compress::encoder::{CompressOptions, compress, compress_to_vec};

    /// Header for `original` followed by a hand-written payload.
    fn stream(original: &[u8], window: u16, payload: &[u8]) -> Vec<u8> {
        let header = Header {
            original_size: original.len() as u32,
            crc: checksum::crc32(original),
            window_size: window,
        };
        let mut out = header.encode().to_vec();
        out.extend_from_slice(payload);
        out
    }

    #[test]
    fn literal_stream() {
        let s = stream(b"abc", 1024, b"abc");
        let mut out = [0u8; 3];
        assert_eq!(decompress(&s, &mut out).unwrap(), 3);
        assert_eq!(&out, b"abc");
    }

    #[test]
    fn escaped_literals() {
        let original = [0xFF, 0xBF, 0xC0];
        let s = stream(&original, 1024, &[0xBF, 0xFF, 0xBF, 0xBF, 0xBF, 0xC0]);
        assert_eq!(decompress_to_vec(&s).unwrap(), original);
    }

    #[test]
    fn overlapping_match_repeats() {
        // 'a' then copy 9 bytes from distance 1.
        let original = b"aaaaaaaaaa";
        let s = stream(original, 1024, &[b'a', 0xC0, 0x01, 0x00, 9 - 3]);
        assert_eq!(decompress_to_vec(&s).unwrap(), original);
    }

    #[test]
    fn pattern_match() {
        let original = b"abcabcabc";
        let s = stream(original, 65535, &[b'a', b'b', b'c', 0xC0, 0x03, 0x00, 6 - 3]);
        assert_eq!(decompress_to_vec(&s).unwrap(), original);
    }

    #[test]
    fn empty_stream() {
        let s = stream(b"", 65535, &[]);
        let mut out: [u8; 0] = [];
        assert_eq!(decompress(&s, &mut out).unwrap(), 0);
        assert!(decompress_to_vec(&s).unwrap().is_empty());
    }

    #[test]
    fn trailing_bytes_ignored() {
        let s = stream(b"hi", 1024, b"hi\x00\x01\x02");
        assert_eq!(decompress_to_vec(&s).unwrap(), b"hi");
    }

    #[test]
    fn header_errors_propagate() {
        let mut out = [0u8; 16];
        assert_eq!(
            decompress(&[0u8; 5], &mut out),
            Err(DecodeError::TooShort { len: 5 })
        );
        let mut s = stream(b"x", 1024, b"x");
        s[0] ^= 0xFF;
        assert!(matches!(
            decompress(&s, &mut out),
            Err(DecodeError::BadMagic { .. })
        ));
    }

    #[test]
    fn output_too_small() {
        let s = stream(b"hello", 1024, b"hello");
        let mut out = [0u8; 4];
        assert_eq!(
            decompress(&s, &mut out),
            Err(DecodeError::OutputTooSmall {
                needed: 5,
                available: 4
            })
        );
    }

    #[test]
    fn distance_zero_rejected() {
        let s = stream(b"aaaa", 1024, &[b'a', 0xC0, 0x00, 0x00, 0x00]);
        assert!(matches!(
            decompress_to_vec(&s),
            Err(DecodeError::InvalidDistance { distance: 0, .. })
        ));
    }

    #[test]
    fn distance_before_start_rejected() {
        let s = stream(b"aaaa", 1024, &[b'a', 0xC0, 0x02, 0x00, 0x00]);
        assert_eq!(
            decompress_to_vec(&s),
            Err(DecodeError::InvalidDistance {
                distance: 2,
                position: 1,
                window: 1024
            })
        );
    }

    #[test]
    fn distance_beyond_window_rejected() {
        let original = vec![b'z'; 2000];
        let mut payload = vec![b'z'; 1500];
        // Distance 1100 is inside the output but outside a 1024-byte window.
        payload.extend_from_slice(&[0xC0, 0x4C, 0x04, 0xFF]);
        let s = stream(&original, 1024, &payload);
        assert!(matches!(
            decompress_to_vec(&s),
            Err(DecodeError::InvalidDistance {
                distance: 1100,
                window: 1024,
                ..
            })
        ));
    }

    #[test]
    fn match_overrun_rejected() {
        let s = stream(b"aaaa", 1024, &[b'a', 0xC0, 0x01, 0x00, 0x01]);
        assert_eq!(
            decompress_to_vec(&s),
            Err(DecodeError::MatchOverrun {
                position: 1,
                length: 4,
                size: 4
            })
        );
    }

    #[test]
    fn short_payload_is_size_mismatch() {
        let s = stream(b"abcd", 1024, b"ab");
        let mut out = [0u8; 4];
        assert_eq!(
            decompress(&s, &mut out),
            Err(DecodeError::SizeMismatch {
                expected: 4,
                actual: 2
            })
        );
    }

    #[test]
    fn truncated_match_token_rejected() {
        let s = stream(b"abcd", 1024, &[b'a', 0xC0, 0x01]);
        let mut out = [0u8; 4];
        assert_eq!(
            decompress(&s, &mut out),
            Err(DecodeError::TruncatedToken {
                offset: HEADER_SIZE + 1,
                needed: 4,
                available: 2
            })
        );
    }

    #[test]
    fn escape_at_end_of_stream_rejected() {
        let s = stream(b"abc\xC0", 1024, b"abc\xBF");
        let mut out = [0u8; 4];
        assert_eq!(
            decompress(&s, &mut out),
            Err(DecodeError::TruncatedToken {
                offset: HEADER_SIZE + 3,
                needed: 2,
                available: 1
            })
        );
    }

    #[test]
    fn short_payload_fails_plausibility_before_replay() {
        // Two payload bytes can never produce four output bytes.
        let s = stream(b"abcd", 1024, b"ab");
        assert_eq!(
            decompress_to_vec(&s),
            Err(DecodeError::ImplausibleSize {
                declared: 4,
                limit: 2
            })
        );
    }

    #[test]
    fn header_returned_with_output() {
        let s = stream(b"hey", 4096, b"hey");
        let (header, out) = decompress_with_header(&s).unwrap();
        assert_eq!(header.window_size, 4096);
        assert_eq!(header.original_size, 3);
        assert_eq!(out, b"hey");
    }

    #[test]
    fn checksum_mismatch() {
        let mut s = stream(b"abc", 1024, b"abc");
        s[HEADER_SIZE + 1] = b'x';
        assert!(matches!(
            decompress_to_vec(&s),
            Err(DecodeError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn implausible_size_rejected_before_allocation() {
        let mut s = stream(b"", 1024, b"abcd");
        s[4..8].copy_from_slice(&u32::MAX.to_le_bytes());
        assert_eq!(
            decompress_to_vec(&s),
            Err(DecodeError::ImplausibleSize {
                declared: u32::MAX as usize,
                limit: 258
            })
        );
    }

    #[test]
    fn expansion_bound() {
        assert_eq!(max_decompressed_len(0), 0);
        assert_eq!(max_decompressed_len(3), 3);
        assert_eq!(max_decompressed_len(4), 258);
        assert_eq!(max_decompressed_len(9), 2 * 258 + 1);
    }

    #[test]
    fn truncated_encoder_output_is_rejected() {
        let input: Vec<u8> = (0xC0..=0xFF).collect();
        let mut buf = vec![0u8; input.len() + HEADER_SIZE];
        let n = compress(&input, &mut buf, 0).unwrap();
        let mut out = vec![0u8; input.len()];
        assert_eq!(
            decompress(&buf[..n], &mut out),
            Err(DecodeError::SizeMismatch {
                expected: 64,
                actual: 32
            })
        );
    }

    #[test]
    fn roundtrip_through_encoder() {
        let input = b"The quick brown fox jumps over the lazy dog. The quick brown fox!";
        let packed = compress_to_vec(input, &CompressOptions::default()).unwrap();
        assert_eq!(decompress_to_vec(&packed).unwrap(), input);
    }
}
