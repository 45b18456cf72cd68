// Bounded write cursor over a caller-provided output buffer.

use thiserror::Error;

/// The cursor cannot take the requested bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CursorError {
    #[error("output exhausted: need {needed} bytes, {remaining} remaining")]
    Exhausted { needed: usize, remaining: usize },
}

/// Writes into `&mut [u8]`, checking capacity before every write.
///
/// A failed write leaves the buffer and position untouched, so everything
/// before the position stays a well-formed prefix.
#[derive(Debug)]
pub struct OutputCursor<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> OutputCursor<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes written so far.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Append all of `bytes` or nothing.
    #[inline]
    pub fn write(&mut self, bytes: &[u8]) -> Result<(), CursorError> {
        let remaining = self.remaining();
        if bytes.len() > remaining {
            return Err(CursorError::Exhausted {
                needed: bytes.len(),
                remaining,
            });
        }
        self.buf[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
        Ok(())
    }
}
