// Fixed 14-byte stream header.
//
//   offset 0   magic            u32 LE  0x5A4E5A50
//   offset 4   original size    u32 LE
//   offset 8   CRC32 of input   u32 LE
//   offset 12  window size      u16 LE
//
// The token stream starts at offset 14.

use crate::compress::decoder::DecodeError;

/// Stream magic ("PZNZ" on disk, little-endian).
pub const MAGIC: u32 = 0x5A4E_5A50;

/// Encoded header length in bytes.
pub const HEADER_SIZE: usize = 14;

/// Parsed stream header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Uncompressed length.
    pub original_size: u32,
    /// CRC32 of the uncompressed data.
    pub crc: u32,
    /// Window the encoder used.
    pub window_size: u16,
}

impl Header {
    /// Serialize to the on-disk layout.
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out[0..4].copy_from_slice(&MAGIC.to_le_bytes());
        out[4..8].copy_from_slice(&self.original_size.to_le_bytes());
        out[8..12].copy_from_slice(&self.crc.to_le_bytes());
        out[12..14].copy_from_slice(&self.window_size.to_le_bytes());
        out
    }

    /// Parse and validate the header at the start of `input`.
    ///
    /// Checks length, magic, and that the window is non-zero. Whether the
    /// caller's output buffer can hold `original_size` is checked by the
    /// decoder.
    pub fn parse(input: &[u8]) -> Result<Self, DecodeError> {
        if input.len() < HEADER_SIZE {
            return Err(DecodeError::TooShort { len: input.len() });
        }

        let magic = read_u32_le(&input[0..4]);
        if magic != MAGIC {
            return Err(DecodeError::BadMagic { found: magic });
        }

        let header = Self {
            original_size: read_u32_le(&input[4..8]),
            crc: read_u32_le(&input[8..12]),
            window_size: u16::from_le_bytes([input[12], input[13]]),
        };

        // A u16 cannot exceed the 65535 maximum; only zero is invalid.
        if header.window_size == 0 {
            return Err(DecodeError::InvalidWindow {
                window: header.window_size,
            });
        }

        log::trace!(
            "header: size={} crc={:#010X} window={}",
            header.original_size,
            header.crc,
            header.window_size
        );
        Ok(header)
    }
}

#[inline]
fn read_u32_le(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}
