// Token stream encoding.
//
// | Kind            | Leading byte | Size | Payload                              |
// |-----------------|--------------|------|--------------------------------------|
// | Match           | 0xC0         | 4    | distance u16 LE, length - MIN_MATCH  |
// | Escaped literal | 0xBF         | 2    | literal value (0xBF or >= 0xC0)      |
// | Direct literal  | the byte     | 1    | 0x00..=0xBE                          |
//
// Literal values >= 0xBF always go through the escape so that a leading
// 0xBF or 0xC0 is unambiguous.

use super::header::HEADER_SIZE;
use crate::compress::decoder::DecodeError;
use crate::hash::config::MIN_MATCH;

/// Leading byte of a match token.
pub const MATCH_MARKER: u8 = 0xC0;

/// Leading byte of an escaped literal.
pub const ESCAPE_MARKER: u8 = 0xBF;

/// Encoded size of a match token.
pub const MATCH_TOKEN_LEN: usize = 4;

/// Encoded size of an escaped literal.
pub const ESCAPED_LITERAL_LEN: usize = 2;

/// Largest encoded token.
pub const MAX_TOKEN_LEN: usize = MATCH_TOKEN_LEN;

/// Whether a literal byte must be written as an escaped literal.
#[inline(always)]
pub const fn needs_escape(byte: u8) -> bool {
    byte >= ESCAPE_MARKER
}

/// One unit of the compressed stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// A single byte, escaped on the wire when [`needs_escape`] says so.
    Literal(u8),
    /// Copy `length` bytes starting `distance` bytes back in the output.
    Match { distance: u16, length: u16 },
}

impl Token {
    /// Size of this token on the wire.
    #[inline]
    pub const fn encoded_len(&self) -> usize {
        match *self {
            Self::Literal(b) if needs_escape(b) => ESCAPED_LITERAL_LEN,
            Self::Literal(_) => 1,
            Self::Match { .. } => MATCH_TOKEN_LEN,
        }
    }

    /// Encode into `buf`, returning the used prefix.
    ///
    /// Match lengths must lie in `MIN_MATCH..=MAX_MATCH`.
    #[inline]
    pub fn encode<'b>(&self, buf: &'b mut [u8; MAX_TOKEN_LEN]) -> &'b [u8] {
        match *self {
            Self::Literal(b) if needs_escape(b) => {
                buf[0] = ESCAPE_MARKER;
                buf[1] = b;
                &buf[..ESCAPED_LITERAL_LEN]
            }
            Self::Literal(b) => {
                buf[0] = b;
                &buf[..1]
            }
            Self::Match { distance, length } => {
                debug_assert!((MIN_MATCH..=MIN_MATCH + 255).contains(&(length as usize)));
                let [lo, hi] = distance.to_le_bytes();
                buf[0] = MATCH_MARKER;
                buf[1] = lo;
                buf[2] = hi;
                buf[3] = (length as usize - MIN_MATCH) as u8;
                &buf[..MATCH_TOKEN_LEN]
            }
        }
    }
}

/// Iterator over the tokens of a payload (the bytes after the header).
///
/// Only structure is checked here (complete tokens); distance and length
/// validity against the output are the decoder's job. After the first
/// error the iterator is exhausted.
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    payload: &'a [u8],
    pos: usize,
}

impl<'a> Tokens<'a> {
    pub fn new(payload: &'a [u8]) -> Self {
        Self { payload, pos: 0 }
    }

    /// Payload bytes consumed so far.
    pub fn consumed(&self) -> usize {
        self.pos
    }

    fn truncated(&mut self, needed: usize) -> DecodeError {
        let err = DecodeError::TruncatedToken {
            offset: HEADER_SIZE + self.pos,
            needed,
            available: self.payload.len() - self.pos,
        };
        self.pos = self.payload.len();
        err
    }
}

impl Iterator for Tokens<'_> {
    type Item = Result<Token, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        let payload = self.payload;
        let rest = &payload[self.pos..];
        let lead = *rest.first()?;

        let token = match lead {
            ESCAPE_MARKER => {
                if rest.len() < ESCAPED_LITERAL_LEN {
                    return Some(Err(self.truncated(ESCAPED_LITERAL_LEN)));
                }
                self.pos += ESCAPED_LITERAL_LEN;
                Token::Literal(rest[1])
            }
            MATCH_MARKER => {
                if rest.len() < MATCH_TOKEN_LEN {
                    return Some(Err(self.truncated(MATCH_TOKEN_LEN)));
                }
                self.pos += MATCH_TOKEN_LEN;
                Token::Match {
                    distance: u16::from_le_bytes([rest[1], rest[2]]),
                    length: rest[3] as u16 + MIN_MATCH as u16,
                }
            }
            b => {
                self.pos += 1;
                Token::Literal(b)
            }
        };
        Some(Ok(token))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(t: Token) -> Vec<u8> {
        let mut buf = [0u8; MAX_TOKEN_LEN];
        t.encode(&mut buf).to_vec()
    }

    #[test]
    fn direct_literals() {
        for b in [0x00u8, 0x41, 0xBE] {
            assert_eq!(encode(Token::Literal(b)), [b]);
            assert_eq!(Token::Literal(b).encoded_len(), 1);
        }
    }

    #[test]
    fn escaped_literals() {
        for b in [0xBFu8, 0xC0, 0xC1, 0xFF] {
            assert_eq!(encode(Token::Literal(b)), [0xBF, b]);
            assert_eq!(Token::Literal(b).encoded_len(), 2);
        }
    }

    #[test]
    fn match_layout() {
        let t = Token::Match {
            distance: 0x1234,
            length: 258,
        };
        assert_eq!(encode(t), [0xC0, 0x34, 0x12, 0xFF]);
        assert_eq!(t.encoded_len(), 4);

        let t = Token::Match {
            distance: 1,
            length: 3,
        };
        assert_eq!(encode(t), [0xC0, 0x01, 0x00, 0x00]);
    }

    #[test]
    fn parse_mixed_stream() {
        let payload = [0x41, 0xBF, 0xC0, 0xC0, 0x05, 0x00, 0x07, 0xBF, 0xBF, 0x00];
        let tokens: Vec<Token> = Tokens::new(&payload).map(Result::unwrap).collect();
        assert_eq!(
            tokens,
            [
                Token::Literal(0x41),
                Token::Literal(0xC0),
                Token::Match {
                    distance: 5,
                    length: 10
                },
                Token::Literal(0xBF),
                Token::Literal(0x00),
            ]
        );
    }

    #[test]
    fn truncated_escape() {
        let payload = [0x41, 0xBF];
        let mut it = Tokens::new(&payload);
        assert_eq!(it.next().unwrap().unwrap(), Token::Literal(0x41));
        match it.next() {
            Some(Err(DecodeError::TruncatedToken {
                offset,
                needed,
                available,
            })) => {
                assert_eq!(offset, HEADER_SIZE + 1);
                assert_eq!(needed, 2);
                assert_eq!(available, 1);
            }
            other => panic!("expected truncated token, got {other:?}"),
        }
        assert!(it.next().is_none());
    }

    #[test]
    fn truncated_match() {
        let payload = [0xC0, 0x01, 0x00];
        let mut it = Tokens::new(&payload);
        assert!(matches!(
            it.next(),
            Some(Err(DecodeError::TruncatedToken { needed: 4, .. }))
        ));
        assert!(it.next().is_none());
        assert_eq!(it.consumed(), payload.len());
    }

    #[test]
    fn empty_payload() {
        assert_eq!(Tokens::new(&[]).count(), 0);
    }
}
