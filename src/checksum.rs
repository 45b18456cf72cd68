// CRC32 (ISO 3309 / zlib) used to validate whole compressed streams.
//
// Computed byte-at-a-time with eight shift steps per byte.

/// Reflected CRC32 polynomial.
pub const CRC32_POLY: u32 = 0xEDB8_8320;

const CRC32_INIT: u32 = 0xFFFF_FFFF;

#[inline(always)]
fn update_byte(mut crc: u32, byte: u8) -> u32 {
    crc ^= byte as u32;
    for _ in 0..8 {
        // All-ones mask when the low bit is set, zero otherwise.
        let mask = (crc & 1).wrapping_neg();
        crc = (crc >> 1) ^ (CRC32_POLY & mask);
    }
    crc
}

/// Compute the CRC32 of `data`.
pub fn crc32(data: &[u8]) -> u32 {
    !data.iter().fold(CRC32_INIT, |crc, &b| update_byte(crc, b))
}

/// Incremental CRC32 state.
///
/// Feeding the same bytes through any sequence of `update` calls yields
/// the same value as a single [`crc32`] call.
#[derive(Debug, Clone, Copy)]
pub struct Crc32 {
    state: u32,
}

impl Default for Crc32 {
    fn default() -> Self {
        Self { state: CRC32_INIT }
    }
}

impl Crc32 {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, data: &[u8]) {
        self.state = data.iter().fold(self.state, |crc, &b| update_byte(crc, b));
    }

    pub fn finalize(&self) -> u32 {
        !self.state
    }
}
