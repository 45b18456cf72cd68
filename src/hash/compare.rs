// Lane-width-agnostic forward byte comparison.
//
// Backends (selected once per process by CPU detection):
//   - x86_64 AVX2: 32-byte lanes
//   - x86_64 SSE2: 16-byte lanes
//   - aarch64 NEON: 16-byte lanes
//   - Scalar: 8-byte lanes emulated with u64 XOR, available everywhere
//
// Every backend returns exactly what a byte-by-byte loop would.

use std::fmt;
use std::sync::OnceLock;

/// Function pointer type for comparison kernels.
///
/// Kernels assume `n <= a.len()` and `n <= b.len()`; [`Comparator::compare`]
/// clamps before calling.
pub type CompareFn = fn(&[u8], &[u8], usize) -> usize;

/// Vector backend (and therefore lane width) used for comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lanes {
    Scalar,
    Sse2,
    Avx2,
    Neon,
}

impl Lanes {
    /// Bytes compared per lane step.
    pub const fn width(self) -> usize {
        match self {
            Self::Scalar => 8,
            Self::Sse2 | Self::Neon => 16,
            Self::Avx2 => 32,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Scalar => "scalar",
            Self::Sse2 => "sse2",
            Self::Avx2 => "avx2",
            Self::Neon => "neon",
        }
    }

    /// Whether the running CPU supports this backend.
    pub fn is_available(self) -> bool {
        match self {
            Self::Scalar => true,
            #[cfg(target_arch = "x86_64")]
            Self::Sse2 => is_x86_feature_detected!("sse2"),
            #[cfg(target_arch = "x86_64")]
            Self::Avx2 => is_x86_feature_detected!("avx2"),
            // NEON is mandatory on aarch64.
            #[cfg(target_arch = "aarch64")]
            Self::Neon => true,
            #[allow(unreachable_patterns)]
            _ => false,
        }
    }

    /// All backends usable on this CPU, widest first.
    pub fn available() -> Vec<Lanes> {
        [Self::Avx2, Self::Sse2, Self::Neon, Self::Scalar]
            .into_iter()
            .filter(|l| l.is_available())
            .collect()
    }
}

impl fmt::Display for Lanes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} bytes)", self.name(), self.width())
    }
}

/// A byte comparator bound to one backend.
#[derive(Clone, Copy)]
pub struct Comparator {
    lanes: Lanes,
    func: CompareFn,
}

impl fmt::Debug for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Comparator")
            .field("lanes", &self.lanes)
            .finish()
    }
}

impl Comparator {
    /// The widest backend supported by the running CPU.
    pub fn detect() -> Self {
        static DISPATCH: OnceLock<Comparator> = OnceLock::new();
        *DISPATCH.get_or_init(|| {
            let lanes = Lanes::available()
                .into_iter()
                .next()
                .unwrap_or(Lanes::Scalar);
            let cmp = Self::with_lanes(lanes).unwrap_or_else(Self::scalar);
            log::debug!("byte comparator: {}", cmp.lanes);
            cmp
        })
    }

    /// The portable backend.
    pub fn scalar() -> Self {
        Self {
            lanes: Lanes::Scalar,
            func: compare_scalar,
        }
    }

    /// A comparator for a specific backend, or `None` if this CPU lacks it.
    pub fn with_lanes(lanes: Lanes) -> Option<Self> {
        if !lanes.is_available() {
            return None;
        }
        let func: CompareFn = match lanes {
            Lanes::Scalar => compare_scalar,
            #[cfg(target_arch = "x86_64")]
            Lanes::Sse2 => compare_sse2_call,
            #[cfg(target_arch = "x86_64")]
            Lanes::Avx2 => compare_avx2_call,
            #[cfg(target_arch = "aarch64")]
            Lanes::Neon => compare_neon_call,
            #[allow(unreachable_patterns)]
            _ => return None,
        };
        Some(Self { lanes, func })
    }

    pub fn lanes(&self) -> Lanes {
        self.lanes
    }

    /// Count of leading equal bytes of `a` and `b`, at most `max_len`.
    #[inline(always)]
    pub fn compare(&self, a: &[u8], b: &[u8], max_len: usize) -> usize {
        let n = max_len.min(a.len()).min(b.len());
        (self.func)(a, b, n)
    }
}

impl Default for Comparator {
    fn default() -> Self {
        Self::detect()
    }
}

// ---------------------------------------------------------------------------
// Scalar (8-byte lanes)
// ---------------------------------------------------------------------------

#[inline(always)]
fn load_u64_le(s: &[u8]) -> u64 {
    let mut word = [0u8; 8];
    word.copy_from_slice(&s[..8]);
    u64::from_le_bytes(word)
}

fn compare_scalar(a: &[u8], b: &[u8], n: usize) -> usize {
    let mut i = 0;

    while i + 8 <= n {
        let diff = load_u64_le(&a[i..]) ^ load_u64_le(&b[i..]);
        if diff != 0 {
            // Little-endian load: the first differing byte holds the lowest set bit.
            return i + (diff.trailing_zeros() / 8) as usize;
        }
        i += 8;
    }

    while i < n && a[i] == b[i] {
        i += 1;
    }
    i
}

// ---------------------------------------------------------------------------
// x86_64 AVX2 (32-byte lanes)
// ---------------------------------------------------------------------------

#[cfg(target_arch = "x86_64")]
fn compare_avx2_call(a: &[u8], b: &[u8], n: usize) -> usize {
    // Safety: only reachable through `with_lanes`, which checked for AVX2.
    unsafe { compare_avx2(a, b, n) }
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
unsafe fn compare_avx2(a: &[u8], b: &[u8], n: usize) -> usize {
    use std::arch::x86_64::*;
    let mut i = 0;

    // Safety: loop guard keeps every 32-byte load inside both slices
    // (n <= a.len() and n <= b.len()).
    unsafe {
        while i + 32 <= n {
            let va = _mm256_loadu_si256(a.as_ptr().add(i) as *const __m256i);
            let vb = _mm256_loadu_si256(b.as_ptr().add(i) as *const __m256i);
            let mask = _mm256_movemask_epi8(_mm256_cmpeq_epi8(va, vb)) as u32;
            if mask != u32::MAX {
                return i + (!mask).trailing_zeros() as usize;
            }
            i += 32;
        }
    }

    while i < n && a[i] == b[i] {
        i += 1;
    }
    i
}

// ---------------------------------------------------------------------------
// x86_64 SSE2 (16-byte lanes)
// ---------------------------------------------------------------------------

#[cfg(target_arch = "x86_64")]
fn compare_sse2_call(a: &[u8], b: &[u8], n: usize) -> usize {
    // Safety: only reachable through `with_lanes`, which checked for SSE2.
    unsafe { compare_sse2(a, b, n) }
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "sse2")]
unsafe fn compare_sse2(a: &[u8], b: &[u8], n: usize) -> usize {
    use std::arch::x86_64::*;
    let mut i = 0;

    // Safety: loop guard keeps every 16-byte load inside both slices.
    unsafe {
        while i + 16 <= n {
            let va = _mm_loadu_si128(a.as_ptr().add(i) as *const __m128i);
            let vb = _mm_loadu_si128(b.as_ptr().add(i) as *const __m128i);
            let mask = _mm_movemask_epi8(_mm_cmpeq_epi8(va, vb)) as u32 as u16;
            if mask != u16::MAX {
                return i + (!mask).trailing_zeros() as usize;
            }
            i += 16;
        }
    }

    while i < n && a[i] == b[i] {
        i += 1;
    }
    i
}

// ---------------------------------------------------------------------------
// aarch64 NEON (16-byte lanes)
// ---------------------------------------------------------------------------

#[cfg(target_arch = "aarch64")]
fn compare_neon_call(a: &[u8], b: &[u8], n: usize) -> usize {
    // Safety: NEON is mandatory on aarch64.
    unsafe { compare_neon(a, b, n) }
}

#[cfg(target_arch = "aarch64")]
#[target_feature(enable = "neon")]
unsafe fn compare_neon(a: &[u8], b: &[u8], n: usize) -> usize {
    use std::arch::aarch64::*;
    let mut i = 0;

    // Safety: loop guard keeps every 16-byte load inside both slices.
    unsafe {
        while i + 16 <= n {
            let va = vld1q_u8(a.as_ptr().add(i));
            let vb = vld1q_u8(b.as_ptr().add(i));
            let eq = vceqq_u8(va, vb);
            // Narrowing shift packs each 0x00/0xFF lane into one nibble of a u64.
            let packed = vshrn_n_u16::<4>(vreinterpretq_u16_u8(eq));
            let nibbles = vget_lane_u64::<0>(vreinterpret_u64_u8(packed));
            if nibbles != u64::MAX {
                return i + ((!nibbles).trailing_zeros() / 4) as usize;
            }
            i += 16;
        }
    }

    while i < n && a[i] == b[i] {
        i += 1;
    }
    i
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
